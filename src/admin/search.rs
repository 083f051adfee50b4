//! 呼号搜索 - 管理端流程
//!
//! 结果在客户端按呼号聚簇展示；搜索视图里的批准/驳回完成后
//! 重新执行同一查询，而不是修补本地状态

use anyhow::Result;
use tracing::info;

use crate::clients::{AdminClient, AdminSession};
use crate::models::SearchHit;

/// 呼号搜索会话
pub struct CallsignSearch {
    query: String,
    results: Vec<SearchHit>,
    searched: bool,
}

impl CallsignSearch {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            searched: false,
        }
    }

    pub fn results(&self) -> &[SearchHit] {
        &self.results
    }

    pub fn searched(&self) -> bool {
        self.searched
    }

    /// 执行搜索；空查询直接忽略
    ///
    /// # 返回
    /// 命中条数
    pub async fn run(
        &mut self,
        client: &AdminClient,
        session: &AdminSession,
        query: &str,
    ) -> Result<usize> {
        let query = query.trim().to_uppercase();
        if query.is_empty() {
            return Ok(0);
        }

        self.results = client.search(session, &query).await?;
        self.query = query;
        self.searched = true;
        Ok(self.results.len())
    }

    /// 按呼号聚簇（保持首次出现顺序）
    pub fn grouped(&self) -> Vec<(String, Vec<&SearchHit>)> {
        group_by_callsign(&self.results)
    }

    /// 搜索视图里批准：调用后重跑当前查询
    pub async fn approve(
        &mut self,
        client: &AdminClient,
        session: &AdminSession,
        attempt_id: &str,
    ) -> Result<i32> {
        let certificate_number = client.approve(session, attempt_id).await?;
        info!("✅ 已批准 {} - 证书 #{}", attempt_id, certificate_number);
        let query = self.query.clone();
        self.run(client, session, &query).await?;
        Ok(certificate_number)
    }

    /// 搜索视图里驳回（不带备注）：调用后重跑当前查询
    pub async fn reject(
        &mut self,
        client: &AdminClient,
        session: &AdminSession,
        attempt_id: &str,
    ) -> Result<()> {
        client.reject(session, attempt_id, None).await?;
        info!("🚫 已驳回 {}", attempt_id);
        let query = self.query.clone();
        self.run(client, session, &query).await?;
        Ok(())
    }
}

impl Default for CallsignSearch {
    fn default() -> Self {
        Self::new()
    }
}

/// 把命中列表按呼号聚成簇，呼号顺序取首次出现顺序
pub fn group_by_callsign(results: &[SearchHit]) -> Vec<(String, Vec<&SearchHit>)> {
    let mut groups: Vec<(String, Vec<&SearchHit>)> = Vec::new();
    for hit in results {
        match groups.iter_mut().find(|(callsign, _)| *callsign == hit.callsign) {
            Some((_, cluster)) => cluster.push(hit),
            None => groups.push((hit.callsign.clone(), vec![hit])),
        }
    }
    groups
}

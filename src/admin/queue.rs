//! 待审队列 - 管理端流程
//!
//! 批准/驳回采用乐观更新：先从本地队列移除，网络失败再回滚。
//! 回滚 = 重新插入并按 created_at 升序排序（近似逆操作，不还原
//! 原始数组位置），显式写成 apply / rollback 两个原语便于测试

use std::collections::HashMap;

use anyhow::Result;
use tracing::{info, warn};

use crate::clients::{AdminClient, AdminSession};
use crate::models::{AttemptHistory, QueueItem};

/// 待审队列
pub struct QueueTriage {
    queue: Vec<QueueItem>,
    /// 呼号 -> 历史记录，取过一次就缓存
    history: HashMap<String, Vec<AttemptHistory>>,
}

impl QueueTriage {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            history: HashMap::new(),
        }
    }

    /// 从后端重新拉取队列（created_at 升序）
    pub async fn refresh(&mut self, client: &AdminClient, session: &AdminSession) -> Result<usize> {
        self.queue = client.queue(session).await?;
        Ok(self.queue.len())
    }

    pub fn queue(&self) -> &[QueueItem] {
        &self.queue
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// 某呼号的历史记录，带本地缓存
    pub async fn history(
        &mut self,
        client: &AdminClient,
        session: &AdminSession,
        callsign: &str,
    ) -> Result<&[AttemptHistory]> {
        if !self.history.contains_key(callsign) {
            let entries = client.callsign_history(session, callsign).await?;
            self.history.insert(callsign.to_string(), entries);
        }
        Ok(self.history.get(callsign).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// 批准：乐观移除 → 网络调用 → 失败回滚
    ///
    /// # 返回
    /// 服务端分配的证书编号
    pub async fn approve(
        &mut self,
        client: &AdminClient,
        session: &AdminSession,
        attempt_id: &str,
    ) -> Result<i32> {
        let removed = self.remove_optimistic(attempt_id);

        match client.approve(session, attempt_id).await {
            Ok(certificate_number) => {
                info!("✅ 已批准 {} - 证书 #{}", attempt_id, certificate_number);
                Ok(certificate_number)
            }
            Err(e) => {
                warn!("批准失败，回滚队列: {}", e);
                if let Some(item) = removed {
                    self.rollback(item);
                }
                Err(e)
            }
        }
    }

    /// 驳回（终态）：乐观移除 → 网络调用 → 失败回滚
    pub async fn reject(
        &mut self,
        client: &AdminClient,
        session: &AdminSession,
        attempt_id: &str,
        note: Option<&str>,
    ) -> Result<()> {
        let removed = self.remove_optimistic(attempt_id);

        match client.reject(session, attempt_id, note).await {
            Ok(()) => {
                info!("🚫 已驳回 {}", attempt_id);
                Ok(())
            }
            Err(e) => {
                warn!("驳回失败，回滚队列: {}", e);
                if let Some(item) = removed {
                    self.rollback(item);
                }
                Err(e)
            }
        }
    }

    /// 乐观更新：先移除，返回被移除的条目供回滚
    fn remove_optimistic(&mut self, attempt_id: &str) -> Option<QueueItem> {
        let index = self.queue.iter().position(|q| q.id == attempt_id)?;
        Some(self.queue.remove(index))
    }

    /// 回滚：重新插入并按 created_at 升序排序
    fn rollback(&mut self, item: QueueItem) {
        self.queue.push(item);
        self.queue.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    }
}

impl Default for QueueTriage {
    fn default() -> Self {
        Self::new()
    }
}

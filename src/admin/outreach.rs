//! 已批准列表与外联跟踪 - 管理端流程
//!
//! 批量"已联络"标记同样是乐观更新，但回滚粒度比队列粗：
//! 失败后整页重新拉取，而不是逐条还原

use std::collections::HashSet;

use anyhow::Result;
use tracing::{info, warn};

use crate::clients::{AdminClient, AdminSession};
use crate::models::{ApprovedPage, GeneratedEmail};

/// 已批准会员列表（分页 + 选择集）
pub struct ApprovedRoster {
    page: ApprovedPage,
    selected: HashSet<String>,
    /// None = 全部，Some(false) = 未联络，Some(true) = 已联络
    filter: Option<bool>,
    per_page: i32,
}

impl ApprovedRoster {
    pub fn new() -> Self {
        Self {
            page: ApprovedPage::default(),
            selected: HashSet::new(),
            filter: None,
            per_page: 25,
        }
    }

    pub fn page(&self) -> &ApprovedPage {
        &self.page
    }

    pub fn selected(&self) -> &HashSet<String> {
        &self.selected
    }

    pub fn filter(&self) -> Option<bool> {
        self.filter
    }

    pub fn total_pages(&self) -> i32 {
        if self.page.per_page <= 0 {
            return 0;
        }
        ((self.page.total + self.page.per_page as i64 - 1) / self.page.per_page as i64) as i32
    }

    /// 切换过滤条件并回到第一页
    pub async fn set_filter(
        &mut self,
        client: &AdminClient,
        session: &AdminSession,
        filter: Option<bool>,
    ) -> Result<()> {
        self.filter = filter;
        self.fetch_page(client, session, 1).await
    }

    /// 拉取指定页；换页清空选择集
    pub async fn fetch_page(
        &mut self,
        client: &AdminClient,
        session: &AdminSession,
        page: i32,
    ) -> Result<()> {
        self.page = client
            .approved(session, page, self.per_page, self.filter)
            .await?;
        self.selected.clear();
        Ok(())
    }

    pub fn toggle_select(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    pub fn toggle_select_all(&mut self) {
        if self.selected.len() == self.page.items.len() {
            self.selected.clear();
        } else {
            self.selected = self.page.items.iter().map(|i| i.id.clone()).collect();
        }
    }

    /// 批量标记"已联络"
    ///
    /// 乐观更新选中行；失败后重新拉取当前页作为回滚
    ///
    /// # 返回
    /// 服务端实际更新的行数（没有选中任何行时为 0）
    pub async fn mark_reached_out(
        &mut self,
        client: &AdminClient,
        session: &AdminSession,
    ) -> Result<u64> {
        if self.selected.is_empty() {
            return Ok(0);
        }

        let ids: Vec<String> = self.selected.iter().cloned().collect();
        self.apply_reached_out(&ids);

        match client.mark_reached_out(session, &ids).await {
            Ok(count) => {
                info!("📨 已标记 {} 位会员为已联络", count);
                Ok(count)
            }
            Err(e) => {
                warn!("标记失败，整页回滚: {}", e);
                let current = self.page.page;
                if let Err(refetch_err) = self.fetch_page(client, session, current).await {
                    warn!("回滚拉取失败: {}", refetch_err);
                }
                Err(e)
            }
        }
    }

    /// 乐观更新：选中行置 reached_out，清空选择集
    fn apply_reached_out(&mut self, ids: &[String]) {
        for item in &mut self.page.items {
            if ids.contains(&item.id) {
                item.reached_out = true;
            }
        }
        self.selected.clear();
    }

    /// 按模板为某位会员生成外联邮件
    pub async fn generate_email(
        &self,
        client: &AdminClient,
        session: &AdminSession,
        member_id: &str,
    ) -> Result<GeneratedEmail> {
        client.generate_email(session, member_id).await
    }
}

impl Default for ApprovedRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApprovedMember;

    fn member(id: &str) -> ApprovedMember {
        ApprovedMember {
            id: id.to_string(),
            callsign: "W1AW".to_string(),
            certificate_number: Some(1),
            validated_at: None,
            email: None,
            reached_out: false,
        }
    }

    fn roster_with(ids: &[&str]) -> ApprovedRoster {
        let mut roster = ApprovedRoster::new();
        roster.page = ApprovedPage {
            items: ids.iter().map(|id| member(id)).collect(),
            total: ids.len() as i64,
            page: 1,
            per_page: 25,
        };
        roster
    }

    #[test]
    fn test_toggle_select_and_select_all() {
        let mut roster = roster_with(&["a", "b"]);
        roster.toggle_select("a");
        assert!(roster.selected().contains("a"));
        roster.toggle_select("a");
        assert!(roster.selected().is_empty());

        roster.toggle_select_all();
        assert_eq!(roster.selected().len(), 2);
        roster.toggle_select_all();
        assert!(roster.selected().is_empty());
    }

    #[test]
    fn test_apply_reached_out_marks_only_selected() {
        let mut roster = roster_with(&["a", "b", "c"]);
        roster.toggle_select("a");
        roster.toggle_select("c");

        let ids: Vec<String> = roster.selected().iter().cloned().collect();
        roster.apply_reached_out(&ids);

        let flags: Vec<bool> = roster.page().items.iter().map(|i| i.reached_out).collect();
        assert_eq!(flags, vec![true, false, true]);
        assert!(roster.selected().is_empty());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let mut roster = roster_with(&["a"]);
        roster.page.total = 51;
        roster.page.per_page = 25;
        assert_eq!(roster.total_pages(), 3);
    }
}

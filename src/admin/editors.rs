//! 段落/题目编辑器 - 管理端流程
//!
//! 两个编辑器都只操作内存里的编辑缓冲（按索引增删改），
//! 只有显式 save-all 才写回后端；丢弃编辑器即丢弃改动，
//! 没有增量自动保存

use anyhow::Result;
use tracing::info;

use crate::clients::{AdminClient, AdminSession};
use crate::error::FlowError;
use crate::models::{QuestionDraft, QuestionRecord, Segment, TestUpdate};

/// 段落编辑缓冲
///
/// save-all 一次性以 `PUT /api/admin/tests/{id}` 写回整张段落表
pub struct SegmentEditor {
    test_id: String,
    segments: Vec<Segment>,
    dirty: bool,
}

impl SegmentEditor {
    pub fn new(test_id: impl Into<String>, initial: Vec<Segment>) -> Self {
        Self {
            test_id: test_id.into(),
            segments: initial,
            dirty: false,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
        self.dirty = true;
    }

    pub fn update_segment(&mut self, index: usize, segment: Segment) -> Result<(), FlowError> {
        if index >= self.segments.len() {
            return Err(FlowError::IndexOutOfRange {
                index,
                len: self.segments.len(),
            });
        }
        self.segments[index] = segment;
        self.dirty = true;
        Ok(())
    }

    pub fn remove_segment(&mut self, index: usize) -> Result<(), FlowError> {
        if index >= self.segments.len() {
            return Err(FlowError::IndexOutOfRange {
                index,
                len: self.segments.len(),
            });
        }
        self.segments.remove(index);
        self.dirty = true;
        Ok(())
    }

    /// 保存全部改动
    pub async fn save_all(&mut self, client: &AdminClient, session: &AdminSession) -> Result<()> {
        let update = TestUpdate {
            active: None,
            segments: Some(self.segments.clone()),
        };
        client.update_test(session, &self.test_id, &update).await?;
        info!("💾 已保存 {} 个段落 ({})", self.segments.len(), self.test_id);
        self.dirty = false;
        Ok(())
    }
}

/// 题目编辑缓冲
///
/// save-all 把缓冲重放为 create/update/delete 调用：
/// 没有 id 的草稿新建，有 id 的更新，被删掉的 id 逐条删除
pub struct QuestionEditor {
    test_id: String,
    drafts: Vec<QuestionDraft>,
    deleted_ids: Vec<String>,
    dirty: bool,
}

impl QuestionEditor {
    /// 从后端加载现有题目进入编辑缓冲
    pub async fn load(
        client: &AdminClient,
        session: &AdminSession,
        test_id: impl Into<String>,
    ) -> Result<Self> {
        let test_id = test_id.into();
        let records = client.questions(session, &test_id).await?;
        Ok(Self::from_records(test_id, records))
    }

    pub fn from_records(test_id: impl Into<String>, records: Vec<QuestionRecord>) -> Self {
        Self {
            test_id: test_id.into(),
            drafts: records.into_iter().map(QuestionDraft::from).collect(),
            deleted_ids: Vec::new(),
            dirty: false,
        }
    }

    pub fn drafts(&self) -> &[QuestionDraft] {
        &self.drafts
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 新增题目（id 留空，save-all 时走 create）
    pub fn add_question(&mut self, mut draft: QuestionDraft) {
        draft.id = None;
        self.drafts.push(draft);
        self.dirty = true;
    }

    /// 按索引更新；保留缓冲里原有的 id
    pub fn update_question(
        &mut self,
        index: usize,
        mut draft: QuestionDraft,
    ) -> Result<(), FlowError> {
        if index >= self.drafts.len() {
            return Err(FlowError::IndexOutOfRange {
                index,
                len: self.drafts.len(),
            });
        }
        draft.id = self.drafts[index].id.clone();
        self.drafts[index] = draft;
        self.dirty = true;
        Ok(())
    }

    /// 按索引删除；已入库的题目记入待删除列表
    pub fn remove_question(&mut self, index: usize) -> Result<(), FlowError> {
        if index >= self.drafts.len() {
            return Err(FlowError::IndexOutOfRange {
                index,
                len: self.drafts.len(),
            });
        }
        let removed = self.drafts.remove(index);
        if let Some(id) = removed.id {
            self.deleted_ids.push(id);
        }
        self.dirty = true;
        Ok(())
    }

    /// 保存全部改动（先删除，再更新/新建）
    pub async fn save_all(&mut self, client: &AdminClient, session: &AdminSession) -> Result<()> {
        for id in &self.deleted_ids {
            client.delete_question(session, id).await?;
        }

        for draft in &self.drafts {
            match &draft.id {
                Some(id) => client.update_question(session, id, draft).await?,
                None => client.create_question(session, &self.test_id, draft).await?,
            }
        }

        info!(
            "💾 已保存题目编辑: {} 道题, 删除 {} 道 ({})",
            self.drafts.len(),
            self.deleted_ids.len(),
            self.test_id
        );

        self.deleted_ids.clear();
        self.dirty = false;
        Ok(())
    }
}

use super::commit::Repository;

/// 待 cherry-pick 的提交 id 集合，保留登记顺序
///
/// 只接受 source 仓库中处于可选状态的提交。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    /// 切换选中状态，返回切换后是否处于选中
    ///
    /// 不存在或不可选的提交不会被加入。
    pub fn toggle(&mut self, id: &str, source: &Repository) -> bool {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
            return false;
        }

        match source.find_commit(id) {
            Some(commit) if commit.is_selectable() => {
                self.ids.push(id.to_string());
                true
            }
            _ => false,
        }
    }

    /// 全选；若已全部选中则清空
    pub fn select_all(&mut self, source: &Repository) {
        let selectable = source.selectable_ids();
        if !self.ids.is_empty() && self.ids.len() == selectable.len() {
            self.ids.clear();
        } else {
            self.ids = selectable;
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// 移除在新快照中已不可选的 id
    pub fn retain_selectable(&mut self, source: &Repository) {
        self.ids.retain(|id| {
            source
                .find_commit(id)
                .map(|c| c.is_selectable())
                .unwrap_or(false)
        });
    }
}

use std::collections::HashMap;

/// 每个步骤开始前刷新的保留变量名
pub const UUID_KEY: &str = "uuid";

/// 运行期变量表
///
/// 整个脚本运行共享同一个扁平命名空间，后面的步骤能看到前面所有捕获的值
#[derive(Debug, Clone, Default)]
pub struct VariableStack {
    variables: HashMap<String, String>,
}

impl VariableStack {
    /// 创建新的空变量表
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入变量，已存在时覆盖
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// 获取变量值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|s| s.as_str())
    }

    /// 写入新的 UUID 并返回它
    pub fn refresh_uuid(&mut self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.insert(UUID_KEY, id.clone());
        id
    }

    /// 变量数量
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// 按变量名排序后的全部变量
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .variables
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort();
        entries
    }
}

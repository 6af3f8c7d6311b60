use serde_json::{Map, Value};

/// Reserved key marking a session as permanent. Stored inside the mapping so
/// the flag survives a round trip through the database.
pub const PERMANENT_KEY: &str = "_permanent";

/// Per-request session state.
///
/// Every mutation flips `modified`, which is how [`SessionInterface::save`]
/// tells "emptied during this request" apart from "was always empty".
///
/// [`SessionInterface::save`]: crate::SessionInterface::save
#[derive(Debug, Clone, PartialEq)]
pub struct DbSession {
    sid: String,
    data: Map<String, Value>,
    new: bool,
    modified: bool,
}

impl DbSession {
    pub fn new(sid: impl Into<String>, data: Map<String, Value>, new: bool) -> Self {
        Self {
            sid: sid.into(),
            data,
            new,
            modified: false,
        }
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// True when the id was generated for this request.
    pub fn is_new(&self) -> bool {
        self.new
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.modified = true;
        self.data.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.data.remove(key);
        if removed.is_some() {
            self.modified = true;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.modified = true;
        self.data.clear();
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self.data.get(PERMANENT_KEY), Some(Value::Bool(true)))
    }

    pub fn set_permanent(&mut self, permanent: bool) {
        if permanent {
            self.insert(PERMANENT_KEY, Value::Bool(true));
        } else {
            self.remove(PERMANENT_KEY);
        }
    }
}

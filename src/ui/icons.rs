pub struct Icons;

impl Icons {
    pub const BOWL: &str = "🍲";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const NEW: &str = "✨";
    pub const EDIT: &str = "📝";
    pub const DEL: &str = "🗑️";
    pub const TABLE: &str = "📋";
    pub const EMPTY: &str = "∅";
}

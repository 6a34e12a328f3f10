pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✅";
    pub const STATS: &str = "📊";
    pub const DATABASE: &str = "🗄️";
    pub const SEED: &str = "🌱";
    pub const DEPARTMENT: &str = "🏢";
    pub const PERSON: &str = "👤";
    pub const REVIEW: &str = "📝";
    pub const DEL: &str = "🗑️";
    pub const EMPTY: &str = "∅";
}

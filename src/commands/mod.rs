pub mod fix_tags;
pub mod organize;

pub mod difficulty;
pub mod float_ext;
pub mod index_hasher;
pub mod map_or_attrs;
pub mod sorted_vec;

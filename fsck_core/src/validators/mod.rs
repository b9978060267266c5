//! Format validators (§4.D): one module per object grammar, dispatched from
//! [`crate::fsck_object`]. Grounded in `fsck.c`'s `fsck_tree`,
//! `fsck_commit_buffer`, and `fsck_tag_buffer`.

pub mod commit;
pub mod tag;
pub mod tree;

//! Data models
//!
//! This module contains all data structures used throughout the Jobdesk
//! job board. Models represent:
//! - Database entities (User, Session, Blog, Job, MasterDataItem)
//! - Input types for create/update operations
//! - Shared pagination types

mod blog;
mod job;
mod master_data;
mod session;
mod user;

pub use blog::{Blog, BlogFilter, CreateBlogInput, UpdateBlogInput};
pub use job::{
    CreateJobInput, EmploymentType, Job, JobFilter, JobStatus, ListParams, PagedResult,
    UpdateJobInput,
};
pub use master_data::{
    CreateMasterDataInput, MasterDataItem, MasterDataKind, UpdateMasterDataInput, ALL_KINDS,
};
pub use session::Session;
pub use user::{CreateUserInput, UpdateUserInput, User, UserRole, UserStatus};

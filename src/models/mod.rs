pub mod admin;
pub mod auth;
pub mod mappers;
pub mod markdown;
pub mod problem;
pub mod record;
pub mod solve;

pub use auth::AuthUser;
pub use mappers::{map_detail_to_problem_detail, map_favorite_to_history, map_record_to_history};
pub use problem::{ProblemDetail, ProblemHistory, ResolvedTags, Tag, TagType};
pub use solve::{SolveModelOption, SolveRequest, RecordSaveRequest};

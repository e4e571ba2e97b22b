pub mod notice;
pub mod solve_flow;
pub mod submission_ctx;
pub mod transcript;

pub use notice::{notice_channel, Notice, NoticeLevel, NoticeReceiver, NoticeSender};
pub use solve_flow::{SolveFailure, SolveFlow, SubmitOutcome};
pub use submission_ctx::SubmissionCtx;
pub use transcript::{Stage, StageMessage, Transcript, TranscriptEntry};

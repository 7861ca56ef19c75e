pub mod job_ctx;
pub mod submit_flow;

pub use job_ctx::JobCtx;
pub use submit_flow::run_transport;

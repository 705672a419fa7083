pub mod admission_limiter;
pub mod api_client;
pub mod vmid_allocator;

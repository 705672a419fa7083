pub mod pool_request;

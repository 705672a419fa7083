pub mod pool_response;

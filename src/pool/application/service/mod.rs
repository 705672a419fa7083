pub mod pool_service;

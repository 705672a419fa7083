//! Creates, updates and deletes a resource pool on a live cluster.
//!
//! Connection settings come from the `PM_*` variables (a `.env` file is
//! honoured):
//!
//! ```text
//! PM_API_URL=https://pve.example.com:8006/api2/json
//! PM_USER=terraform@pve
//! PM_PASS=secret
//! PM_TLS_INSECURE=1
//! RUST_LOG=proxmox_pool_provider=debug cargo run --example pool_lifecycle -- demo-pool
//! ```

use proxmox_pool_provider::{PoolState, ProxmoxProvider, ProxmoxResult};

#[tokio::main]
async fn main() -> ProxmoxResult<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let poolid = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demo-pool".to_string());

    let session = ProxmoxProvider::builder().from_env()?.configure().await?;
    let pools = session.pools();

    let mut pool = PoolState::planned(poolid, "created by pool_lifecycle");
    pools.create(&mut pool).await?;
    println!("created   {:?}", pool);

    pools.update(&mut pool, "comment updated").await?;
    println!("updated   {:?}", pool);

    let vmid = session.next_vm_id().await?;
    println!("next free VM id: {}", vmid);

    pools.delete(&mut pool).await?;
    println!("deleted   {:?}", pool);

    Ok(())
}

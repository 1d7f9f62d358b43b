//! Demonstrates `#[derive(Assemblage)]`.
//!
//! Run with:
//!   cargo run --example derive --features derive

use assemblage::prelude::*;
use assemblage_derive::Assemblage;

#[derive(Assemblage)]
struct Database {}
impl Lifecycle for Database {}

#[derive(Assemblage)]
struct Cache {}
impl Lifecycle for Cache {}

#[derive(Assemblage)]
struct UserService {
    db: Arc<Database>,
    cache: Arc<Cache>,
    #[context]
    ctx: PublicContext,
}
impl Lifecycle for UserService {}

impl UserService {
    fn describe(&self) -> String {
        format!(
            "UserService wired to a database ({}) and a cache ({})",
            self.ctx.has(Identifier::of::<Database>()),
            self.ctx.has(Identifier::of::<Cache>()),
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    println!("=== Assemblage Derive Macro Demo ===\n");

    let builder = Builder::new();
    let user_service = builder.build::<UserService>().await?;

    println!("  {}", user_service.describe());
    println!("\n=== Demo Complete ===");
    println!("\n#[derive(Assemblage)] generated Assemblage::construct, resolving:");
    println!("  - `Arc<Database>`/`Arc<Cache>` fields by type");
    println!("  - the `#[context]` field from the resolver's public context");

    Ok(())
}

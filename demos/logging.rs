//! Demonstrates logging output during a build.
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use assemblage::prelude::*;

struct Database;
impl Assemblage for Database {
    fn construct(_resolver: &Resolver<'_>) -> Result<Self> {
        Ok(Database)
    }
}
impl Lifecycle for Database {}

struct UserService {
    #[allow(dead_code)]
    db: Arc<Database>,
}
impl Assemblage for UserService {
    fn definition() -> AssemblageDef {
        AssemblageDef::new().inject(InjectionTuple::concrete::<Database>())
    }
    fn construct(resolver: &Resolver<'_>) -> Result<Self> {
        Ok(UserService {
            db: resolver.dep::<Database>("db")?,
        })
    }
}
impl Lifecycle for UserService {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(feature = "logging")]
    assemblage::logging::init();

    println!("=== Assemblage Logging Demo ===\n");

    let builder = Builder::new();
    let _service = builder.build::<UserService>().await?;

    let missing = builder.container().has(Identifier::of::<i32>());
    assert!(!missing);

    println!("\n=== Demo Complete ===");
    println!("Check the log output above to see structured logging in action!");
    println!("\nTip: Use --features logging-json for production (JSON output)");
    println!("     Use --features logging-pretty for development (colorful output)");

    Ok(())
}

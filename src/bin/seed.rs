use clap::Parser;
use dongmun::{
    config::Settings,
    domain::{Category, PostDraft, PostRef},
    service::ServiceContext,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "seed")]
#[command(about = "Prepare a dongmun storage file with default accounts", long_about = None)]
struct Args {
    /// Storage URL, overriding configuration (e.g. sqlite://dongmun.db)
    #[arg(long)]
    database_url: Option<String>,

    /// Also write a sample community post with a comment as the sample member
    #[arg(long)]
    with_sample_content: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dongmun=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });
    if let Some(url) = args.database_url {
        settings.storage.url = url;
    }

    println!("🌱 Seeding {}...", settings.storage.url);
    let ctx = ServiceContext::open(settings).await?;

    let created = ctx.auth_service.seed_default_accounts().await?;
    println!("  ✅ Created {} default account(s)", created);

    if args.with_sample_content {
        let user = ctx.auth_service.login("user@goonsan.com", "user123").await?;

        let post = ctx.store.add_post(
            &user,
            PostDraft {
                title: "오랜만에 인사드립니다".to_string(),
                content: "<p>모두 건강하게 지내시나요? 다음 모임에서 뵙겠습니다.</p>".to_string(),
                category: Category::ClassReunion,
            },
        )?;
        ctx.store.add_comment(&user, PostRef::post(post.id), "반갑습니다!")?;
        ctx.auth_service.logout().await?;

        println!("  ✅ Added sample post #{}", post.id);
    }

    ctx.store.flush().await?;

    let stats = ctx.member_service.stats().await;
    let snapshot = ctx.store.snapshot()?;
    println!(
        "🎉 Done: {} member(s), {} notice(s), {} post(s), {} comment(s)",
        stats.total,
        snapshot.notices.len(),
        snapshot.posts.len(),
        snapshot.comments.len()
    );

    Ok(())
}

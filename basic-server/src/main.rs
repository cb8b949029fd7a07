use std::sync::Arc;

use campus::AppBuilder;
use campus::error::ClResult;
use campus::settings::Settings;
use campus::worker::WorkerPool;
use campus_auth_adapter_sqlite::AuthAdapterSqlite;
use campus_meta_adapter_sqlite::MetaAdapterSqlite;

async fn run() -> ClResult<()> {
	// A missing .env file is fine, the process environment is used as is
	dotenv::dotenv().ok();
	let settings = Settings::from_env()?;

	let worker = Arc::new(WorkerPool::new(1, 2));
	let auth_adapter = AuthAdapterSqlite::new(worker.clone(), &settings.db_dir)
		.await?
		.with_secret(settings.secret_key.as_deref())
		.with_token_ttl(settings.access_token_ttl());
	let meta_adapter = MetaAdapterSqlite::new(&settings.db_dir).await?;

	let mut builder = AppBuilder::new();
	builder
		.worker(worker)
		.auth_adapter(Arc::new(auth_adapter))
		.meta_adapter(Arc::new(meta_adapter))
		.settings(settings);
	builder.run().await
}

#[tokio::main]
async fn main() {
	if let Err(e) = run().await {
		tracing::error!("FATAL: {}", e);
		eprintln!("campus: {}", e);
		std::process::exit(1);
	}
}

// vim: ts=4

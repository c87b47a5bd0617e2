#![cfg(feature = "libsql")]

mod common;

use std::sync::Arc;

use libsql_tenancy::prelude::*;

async fn count_rows(ctx: &mut ConnectionContext) -> Result<i64, Box<dyn std::error::Error>> {
    let ConnectionHandle::Libsql(pool) = ctx.connection().await? else {
        panic!("Expected LibSQL connection");
    };
    let conn = pool.get().await?;
    let mut rows = conn.query("SELECT COUNT(*) FROM notes", ()).await?;
    let row = rows.next().await?.expect("one row");
    Ok(row.get::<i64>(0)?)
}

#[test]
fn test06_tenants_get_separate_database_files() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let dir = tempfile::tempdir()?;
        let config = common::local_config(dir.path());
        let platform = Arc::new(PlatformClient::new("unused"));
        let manager = TenantDatabaseManager::new(config.clone(), platform)?;
        let bootstrapper = TenancyBootstrapper::new(&config)?;
        let mut ctx = ConnectionContext::from_config(&config, Arc::new(LibsqlConnector));

        for (id, notes) in [("1", 2), ("2", 5)] {
            let tenant = Tenant::new(id);
            assert!(manager.create_database(&tenant).await);

            bootstrapper.bootstrap(&mut ctx, &tenant).await?;
            {
                let ConnectionHandle::Libsql(pool) = ctx.connection().await? else {
                    panic!("Expected LibSQL connection");
                };
                let conn = pool.get().await?;
                conn.execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);")
                    .await?;
                for i in 0..notes {
                    conn.execute("INSERT INTO notes (body) VALUES (?1)", [format!("note {i}")])
                        .await?;
                }
            }
            bootstrapper.revert(&mut ctx).await?;
        }

        bootstrapper.bootstrap(&mut ctx, &Tenant::new("1")).await?;
        assert_eq!(count_rows(&mut ctx).await?, 2);
        bootstrapper.bootstrap(&mut ctx, &Tenant::new("2")).await?;
        assert_eq!(count_rows(&mut ctx).await?, 5);
        bootstrapper.revert(&mut ctx).await?;

        assert!(dir.path().join("tenant1.sqlite").is_file());
        assert!(dir.path().join("tenant2.sqlite").is_file());
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

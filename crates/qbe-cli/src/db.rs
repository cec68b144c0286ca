use tokio_postgres::NoTls;

pub async fn connect_db(database_url: &str) -> anyhow::Result<tokio_postgres::Client> {
    let (client, connection) = tokio_postgres::connect(database_url, NoTls)
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect to database: {e}"))?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(target: "qbe.session", error = %e, "postgres connection error");
        }
    });
    Ok(client)
}

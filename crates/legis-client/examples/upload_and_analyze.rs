use legis_client::prelude::*;
use legis_client::{ApiError, FileUpload};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    legis_client::load_dotenv();
    legis_client::init_observability();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: upload_and_analyze <file>")?;
    let bytes = std::fs::read(&path)?;
    let file_name = std::path::Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();

    let client = LegisClient::from_env()?;
    let api = client.api();
    if !api.health().await? {
        return Err("backend reports unhealthy".into());
    }

    let uploaded = api.upload(FileUpload::new(file_name, bytes)).await?;
    println!("uploaded {} as {}", uploaded.filename, uploaded.file_id);

    match api.analyze(&uploaded.file_id).await {
        Ok(analysis) => {
            println!("risk: {} ({})", analysis.risk_level, analysis.compliance_status);
            for finding in &analysis.key_findings {
                println!("- {finding}");
            }
        }
        Err(ApiError::HttpStatus { status: 404, .. }) => println!("analysis not available"),
        Err(err) => return Err(err.into()),
    }

    api.delete_file(&uploaded.file_id).await?;
    Ok(())
}

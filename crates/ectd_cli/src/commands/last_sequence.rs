use anyhow::Result;

use ectd_service::EctdService;

pub async fn execute(service: &EctdService) -> Result<()> {
    let sequence = service.last_sequence().await?;
    println!("{}", sequence);
    Ok(())
}

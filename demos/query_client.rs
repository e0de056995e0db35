use sdk_rust::MonitorClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = MonitorClient::new("http://localhost:8000");

    let status = client.status().await?;
    println!("Monitor {} is {}", status.version, status.status);

    match client.latest_health().await? {
        Some(results) => {
            for r in results {
                println!(
                    "{:<20} status={} latency={}ms available={} version_match={}",
                    r.service_name, r.status_code, r.latency_ms, r.is_available, r.version_match
                );
            }
        }
        None => println!("No health check results available yet."),
    }

    Ok(())
}

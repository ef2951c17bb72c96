use hiredesk_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("hiredesk-api: {err}");
        std::process::exit(1);
    }
}

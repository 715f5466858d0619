#[tokio::main]
async fn main() {
    facility_booking::run().await;
}

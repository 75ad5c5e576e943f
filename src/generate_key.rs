// generate_key.rs
// Utility to generate a new JWT signing secret

use rand::distributions::Alphanumeric;
use rand::Rng;

const SECRET_LENGTH: usize = 64;

fn main() {
    println!("Generating new JWT signing secret...\n");

    let secret: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect();

    println!("Add this to your .env file:");
    println!("─────────────────────────────────────────────────");
    println!("JWT_SECRET={}", secret);
    println!("─────────────────────────────────────────────────");
    println!("\nChanging the secret logs out every user and invalidates pending registrations.");
}

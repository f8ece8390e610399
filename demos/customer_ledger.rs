//! Customer ledger walkthrough against the in-memory backend
//!
//! Run with `cargo run --example customer_ledger`, optionally with
//! `RUST_LOG=hisab_kitab_core=debug` to see the service calls.

use hisab_kitab_core::utils::MemoryService;
use hisab_kitab_core::{CustomerEntry, DiscountMode, Hisab, HisabError};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hisab_kitab_core=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    println!("📒 Hisab Kitab - Customer Ledger Example\n");

    let service = MemoryService::new();
    let mut hisab = Hisab::new(service.clone());

    // 1. Account
    println!("👤 Registering and signing in...");
    hisab
        .register("Asha", "9876543210", "secret", "Asha Dairy")
        .await?;
    let user = hisab.sign_in("9876543210", "secret").await?;
    println!("  ✓ Signed in as {} ({})\n", user.name, user.business_name);

    // 2. Bills
    println!("🧾 Recording customer bills...");
    let entries = [
        CustomerEntry::new("Ramesh", "9000000001")
            .rate("100")
            .quantity("2")
            // percentage toggle switched on in the entry form
            .discount("10", DiscountMode::from_toggle(true))
            .received("80")
            .description("Milk, 2 cans"),
        CustomerEntry::new("Sita", "9000000002")
            .rate("45")
            .quantity("4")
            .discount("30", DiscountMode::Absolute),
        CustomerEntry::new("Gopal", "9000000003")
            .rate("12.75")
            .quantity("3")
            .received("20"),
    ];

    let mut saved = Vec::new();
    for entry in &entries {
        let preview = entry.preview();
        let customer = hisab.save_customer(entry).await?;
        println!(
            "  ✓ {}: subtotal ₹{} - discount ₹{} = ₹{} (received ₹{}, due ₹{})",
            customer.name,
            preview.subtotal,
            preview.discount_amount,
            customer.total,
            customer.received_amt,
            customer.balance_due()
        );
        saved.push(customer);
    }
    println!();

    // 3. An entry that never reaches the backend
    println!("🚫 Trying an invalid entry...");
    let invalid = CustomerEntry::new("Hari", "9000000004").rate("0").quantity("5");
    if let Err(err) = hisab.save_customer(&invalid).await {
        let alert = err.alert();
        println!("  ✗ {}: {}\n", alert.title, alert.message);
    }

    // 4. Payment against an existing bill
    println!("💰 Ramesh settles his bill...");
    let mut settle = CustomerEntry::from_customer(&saved[0]);
    settle.received = saved[0].total.to_string();
    let ramesh = hisab.save_customer(&settle).await?;
    println!("  ✓ Balance due for Ramesh: ₹{}\n", ramesh.balance_due());

    // 5. Staff
    println!("🧑‍🤝‍🧑 Adding staff...");
    let staff = hisab.add_staff("Ravi", "9123456780", "pw").await?;
    println!("  ✓ Added {} (#{:?})\n", staff.name, staff.staff_id);

    // 6. Totals
    let user = hisab
        .current_user()
        .ok_or(HisabError::NotSignedIn)?;
    println!("📊 Totals for {}", user.business_name);
    println!("  Paid amount:  ₹{}", user.paid_amount);
    println!("  Rec amount:   ₹{}", user.rec_amount);
    println!("  Outstanding:  ₹{}\n", user.outstanding());

    let found = hisab.search_customers("si").await?;
    println!("🔍 Search \"si\": {} match(es)", found.len());
    for customer in &found {
        println!("  - {} ({})", customer.name, customer.mobile);
    }
    println!();

    // 7. Reconciliation
    println!("⚖️  Reconciling cached totals...");
    let report = hisab.reconcile().await?;
    if report.is_valid {
        println!(
            "  ✓ {} customers, billed ₹{}, received ₹{}",
            report.customer_count, report.billed_total, report.received_total
        );
    } else {
        for issue in &report.issues {
            println!("  ✗ {issue}");
        }
    }

    println!("\n✨ Done after {} backend requests.", service.request_count());
    Ok(())
}

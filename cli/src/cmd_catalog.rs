//! `chainsig catalog`: list loaded signatures or selector collisions.

use anyhow::Result;
use chainsig_registry::Snapshot;
use serde_json::json;

pub fn run(snapshot: &Snapshot, collisions_only: bool, as_json: bool) -> Result<()> {
    if collisions_only {
        return collisions(snapshot, as_json);
    }

    if as_json {
        let records: Vec<_> = snapshot.catalog.iter().map(|r| r.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    for record in snapshot.catalog.iter() {
        println!(
            "{:<8} {:<66}  {}  [{}]",
            record.kind(),
            record.selector().to_hex(),
            record.display_signature(),
            record.source()
        );
    }
    println!(
        "\n{} signatures, {} selectors, {} collisions",
        snapshot.index.len(),
        snapshot.index.selector_count(),
        snapshot.index.collisions().count()
    );
    Ok(())
}

fn collisions(snapshot: &Snapshot, as_json: bool) -> Result<()> {
    if as_json {
        let buckets: Vec<_> = snapshot
            .index
            .collisions()
            .map(|(selector, bucket)| {
                json!({
                    "selector": selector,
                    "signatures": bucket
                        .iter()
                        .map(|r| json!({ "signature": r.human_signature(), "source": r.source() }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&buckets)?);
        return Ok(());
    }

    let mut found = 0;
    for (selector, bucket) in snapshot.index.collisions() {
        found += 1;
        println!("{selector}");
        for record in bucket {
            println!("  {}  [{}]", record.human_signature(), record.source());
        }
    }
    if found == 0 {
        println!("no selector collisions");
    }
    Ok(())
}

//! Human-readable rendering of reports and registry entries.

use std::fmt::Write;

use swapcheck_core::{RouterInfo, SwapAmounts, SwapReport};

pub fn render_report(report: &SwapReport) -> String {
    let tx = &report.transaction;
    let swap = &report.swap;
    let mut out = String::new();

    let router = tx
        .router
        .as_ref()
        .map(|r| format!("{:#x}", r.address))
        .unwrap_or_else(|| "unknown".into());
    let block = swap
        .swap_at_block
        .map(|b| b.to_string())
        .unwrap_or_else(|| "pending".into());

    let _ = writeln!(out, "Transaction  {}", tx.raw.hash);
    let _ = writeln!(out, "Chain        {}", tx.chain);
    let _ = writeln!(out, "Router       {router}");
    let _ = writeln!(out, "Method       {}", tx.decoded_input.name);
    let _ = writeln!(out, "Block        {block}");
    let _ = writeln!(out, "Recipient    {}", swap.recipient);
    let _ = writeln!(out, "State        {}", swap.state);
    let _ = writeln!(out);

    let token_0 = format!("{} ({})", swap.token_0.name, swap.token_0.decimals);
    let token_1 = format!("{} ({})", swap.token_1.name, swap.token_1.decimals);
    let _ = writeln!(out, "{:<10} {:>28} {:>28} {:>20}", "", token_0, token_1, "est. fee");
    for (label, amounts) in [
        ("original", &swap.original_amount),
        ("weth", &swap.weth_amount),
        ("usdt", &swap.usdt_amount),
    ] {
        let _ = writeln!(out, "{}", amounts_row(label, amounts));
    }
    out
}

fn amounts_row(label: &str, amounts: &SwapAmounts) -> String {
    format!(
        "{:<10} {:>28} {:>28} {:>20}",
        label, amounts.token_0, amounts.token_1, amounts.estimated_fee
    )
}

pub fn render_router(router: &RouterInfo) -> String {
    format!(
        "{:#x}\n  base    {:#x}\n  stable  {:#x} ({} decimals)\n  fee     {}",
        router.address, router.base_asset, router.stable_asset, router.stable_decimals, router.swap_fee
    )
}

use rust_decimal::Decimal;

/// Backward walk from a known terminal quantity.
///
/// `deltas[i]` is the signed quantity change booked on day `i`. The result
/// holds the quantity at the close of each day, with the last day equal to
/// `terminal` and `q[i - 1] = q[i] - deltas[i]`. For every `i`,
/// `q[i] + sum(deltas[i + 1..]) == terminal`.
pub fn reverse_accumulate(deltas: &[Decimal], terminal: Decimal) -> Vec<Decimal> {
    let mut quantities = vec![Decimal::ZERO; deltas.len()];
    let mut running = terminal;
    for (i, delta) in deltas.iter().enumerate().rev() {
        quantities[i] = running;
        running -= *delta;
    }
    quantities
}

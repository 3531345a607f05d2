/// Count type used for tile totals, mine counts and revealed-gem counts.
pub type TileCount = u16;

/// Virtual currency amount. Payouts are fractional, so balances are too.
pub type Coins = f64;

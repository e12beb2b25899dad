//! Synthetic receipts used when no OCR service is reachable.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};

/// Sales tax applied to synthetic receipts.
pub const SYNTHETIC_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Source of template indices.
pub trait RandomSource: Send + Sync {
    /// Pick an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local `fastrand` generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct FastRandSource;

impl RandomSource for FastRandSource {
    fn pick(&self, len: usize) -> usize {
        fastrand::usize(..len)
    }
}

/// Always picks the same index (modulo the template count).
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub usize);

impl RandomSource for FixedSource {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// A canned merchant.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptTemplate {
    pub merchant: &'static str,
    pub address: &'static [&'static str],
    pub items: &'static [(&'static str, Decimal)],
}

impl ReceiptTemplate {
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(|(_, price)| *price).sum()
    }

    pub fn tax(&self) -> Decimal {
        (self.subtotal() * SYNTHETIC_TAX_RATE)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn total(&self) -> Decimal {
        self.subtotal() + self.tax()
    }
}

const fn cents(value: u32) -> Decimal {
    Decimal::from_parts(value, 0, 0, false, 2)
}

/// Built-in templates.
pub const TEMPLATES: &[ReceiptTemplate] = &[
    ReceiptTemplate {
        merchant: "STARBUCKS STORE #1234",
        address: &["123 MAIN ST", "CITY, STATE 12345"],
        items: &[("GRANDE LATTE", cents(545)), ("CHOCOLATE CROISSANT", cents(325))],
    },
    ReceiptTemplate {
        merchant: "WAL-MART SUPERCENTER",
        address: &["456 OAK AVE", "TOWN, STATE 67890"],
        items: &[
            ("MILK 1 GAL", cents(399)),
            ("BREAD LOAF", cents(249)),
            ("EGGS DOZEN", cents(499)),
            ("APPLES 2 LB", cents(599)),
        ],
    },
    ReceiptTemplate {
        merchant: "SHELL GAS STATION",
        address: &["789 PINE RD"],
        items: &[("GASOLINE 12.5 GAL", cents(4863))],
    },
];

/// Renders a plausible receipt from one of the built-in templates.
#[derive(Clone)]
pub struct SyntheticReceiptGenerator {
    random: Arc<dyn RandomSource>,
}

impl SyntheticReceiptGenerator {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Pick a template through the random source.
    pub fn choose(&self) -> &'static ReceiptTemplate {
        &TEMPLATES[self.random.pick(TEMPLATES.len()) % TEMPLATES.len()]
    }

    /// Render a receipt stamped with the current local time.
    pub fn generate_now(&self) -> String {
        self.generate(Local::now().naive_local())
    }

    /// Render a receipt stamped with `at`.
    pub fn generate(&self, at: NaiveDateTime) -> String {
        render(self.choose(), at)
    }
}

impl Default for SyntheticReceiptGenerator {
    fn default() -> Self {
        Self::new(Arc::new(FastRandSource))
    }
}

impl std::fmt::Debug for SyntheticReceiptGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntheticReceiptGenerator").finish_non_exhaustive()
    }
}

const COLUMN: usize = 22;

/// Render a template as receipt text.
pub fn render(template: &ReceiptTemplate, at: NaiveDateTime) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", template.merchant);
    for line in template.address {
        let _ = writeln!(out, "{}", line);
    }
    let _ = writeln!(out, "{}", at.format("%Y-%m-%d %H:%M"));
    out.push('\n');

    for (name, price) in template.items {
        let _ = writeln!(out, "{:<COLUMN$}${:.2}", name, price);
    }
    out.push('\n');

    let _ = writeln!(out, "{:<COLUMN$}${:.2}", "SUBTOTAL", template.subtotal());
    let _ = writeln!(out, "{:<COLUMN$}${:.2}", "TAX", template.tax());
    let _ = writeln!(out, "{:<COLUMN$}${:.2}", "TOTAL", template.total());
    out.push('\n');
    out.push_str("THANK YOU!");

    out
}

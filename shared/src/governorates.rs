/// The 24 governorates of Tunisia.
pub const GOVERNORATES: [&str; 24] = [
    "Ariana",
    "B\u{e9}ja",
    "Ben Arous",
    "Bizerte",
    "Gab\u{e8}s",
    "Gafsa",
    "Jendouba",
    "Kairouan",
    "Kasserine",
    "K\u{e9}bili",
    "Le Kef",
    "Mahdia",
    "Manouba",
    "M\u{e9}denine",
    "Monastir",
    "Nabeul",
    "Sfax",
    "Sidi Bouzid",
    "Siliana",
    "Sousse",
    "Tataouine",
    "Tozeur",
    "Tunis",
    "Zaghouan",
];

/// Governorate names in code-point order.
pub fn sorted_governorates() -> Vec<&'static str> {
    let mut names = GOVERNORATES.to_vec();
    names.sort_unstable();
    names
}

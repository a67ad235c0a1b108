//! Fixed report text shared by every output format.

pub const BISMILLAH: &str = "بِسْمِ اللهِ الرَّحْمنِ الرَّحِیم";

/// Introductory line that precedes every published summary.
pub const INTRO: &str = "به گزارش معاونت ارتباطات و رسانه دفتر امام جمعه دهستان میانکاله (زاغمرز)، حجت الاسلام والمسلمین حاج حسین انزائی در خطبه‌های این هفته از نماز جمعه، ضمن سفارش به تقوا اظهار کرد:";

/// Author line drawn on posters, above the quote.
pub const POSTER_AUTHOR: &str =
    "امام جمعه محترم دهستان میانکاله(زاغمرز) حجت الاسلام والمسلمین حاج حسین انزائی:";

pub const POSTER_DATE_PREFIX: &str = "نماز جمعه";
pub const POSTER_DATE_SUFFIX: &str = "دهستان میانکاله (زاغمرز)";

/// Caption above a section's highlighted quote.
pub const QUOTE_CAPTION: &str = "جمله منتخب";

pub const DEFAULT_POSTER_BACKGROUND_URL: &str = "https://raw.githubusercontent.com/amirhossein-gandomkar/AISERMONANALYZER/a3bbbbbe683533ce44b9f00bbc618e66eabbc9f9/kh.png";

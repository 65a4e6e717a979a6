//! User-facing strings in ru/en/tr. Keyed by the user's stored language
//! preference; Russian is the default audience language.

use crate::error::BotError;
use crate::streak::StreakReport;
use crate::types::Language;

use Language::{En, Ru, Tr};

pub fn welcome(lang: Language) -> String {
    let body = match lang {
        Ru => {
            "🕌 <b>Ас-саляму алейкум!</b>\n\n\
             /hadith — случайный хадис (или /hadith сабр — по теме)\n\
             /fav — сохранить последний хадис, /favorites — избранное\n\
             /daily 08:30 — хадис дня, /dailyoff — отключить\n\
             /remind 08:30 — напоминание, /reminders — список\n\
             /bookmark 2:255 — закладка, /bookmarks — список\n\
             /streak — серия дней, /progress — прогресс чтения\n\
             /lang — язык, /help — помощь"
        }
        En => {
            "🕌 <b>As-salamu alaykum!</b>\n\n\
             /hadith — random hadith (or /hadith sabr — by topic)\n\
             /fav — save the last hadith, /favorites — my favourites\n\
             /daily 08:30 — hadith of the day, /dailyoff — disable\n\
             /remind 08:30 — reminder, /reminders — list\n\
             /bookmark 2:255 — bookmark, /bookmarks — list\n\
             /streak — day streak, /progress — reading progress\n\
             /lang — language, /help — help"
        }
        Tr => {
            "🕌 <b>Es-selamu aleyküm!</b>\n\n\
             /hadith — rastgele hadis (veya /hadith sabır — konuya göre)\n\
             /fav — son hadisi kaydet, /favorites — favorilerim\n\
             /daily 08:30 — günün hadisi, /dailyoff — kapat\n\
             /remind 08:30 — hatırlatma, /reminders — liste\n\
             /bookmark 2:255 — yer imi, /bookmarks — liste\n\
             /streak — gün serisi, /progress — okuma ilerlemesi\n\
             /lang — dil, /help — yardım"
        }
    };
    body.to_string()
}

pub fn hadith_title(lang: Language) -> &'static str {
    match lang {
        Ru => "📖 Хадис из Сахих аль-Бухари",
        En => "📖 Hadith from Sahih al-Bukhari",
        Tr => "📖 Sahih el-Buhari'den Hadis",
    }
}

pub fn daily_title(lang: Language) -> &'static str {
    match lang {
        Ru => "🌅 Хадис дня",
        En => "🌅 Hadith of the Day",
        Tr => "🌅 Günün Hadisi",
    }
}

pub fn reminder_title(lang: Language, label: &str) -> String {
    let base = match lang {
        Ru => "🔔 Напоминание",
        En => "🔔 Reminder",
        Tr => "🔔 Hatırlatma",
    };
    if label.is_empty() {
        base.to_string()
    } else {
        format!("{base} — {label}")
    }
}

pub fn loading(lang: Language) -> &'static str {
    match lang {
        Ru => "⏳ Загружаю хадис…",
        En => "⏳ Loading hadith…",
        Tr => "⏳ Hadis yükleniyor…",
    }
}

pub fn no_content(lang: Language) -> &'static str {
    match lang {
        Ru => "🔍 Хадис не найден. Попробуйте другой запрос.",
        En => "🔍 No hadith found. Try a different query.",
        Tr => "🔍 Hadis bulunamadı. Farklı bir arama deneyin.",
    }
}

pub fn fav_saved(lang: Language) -> &'static str {
    match lang {
        Ru => "⭐ Хадис сохранён в избранном!",
        En => "⭐ Hadith saved to favourites!",
        Tr => "⭐ Hadis favorilere kaydedildi!",
    }
}

pub fn fav_dup(lang: Language) -> &'static str {
    match lang {
        Ru => "⭐ Уже в избранном!",
        En => "⭐ Already in favourites!",
        Tr => "⭐ Zaten favorilerde!",
    }
}

pub fn fav_none(lang: Language) -> &'static str {
    match lang {
        Ru => "ℹ️ Нет последнего хадиса. Сначала запросите /hadith.",
        En => "ℹ️ No recent hadith. Request /hadith first.",
        Tr => "ℹ️ Son hadis yok. Önce /hadith isteyin.",
    }
}

pub fn favorites_title(lang: Language) -> &'static str {
    match lang {
        Ru => "⭐ <b>Ваши избранные хадисы:</b>",
        En => "⭐ <b>Your favourite hadiths:</b>",
        Tr => "⭐ <b>Favori hadisleriniz:</b>",
    }
}

pub fn favorites_empty(lang: Language) -> &'static str {
    match lang {
        Ru => "⭐ Нет избранных. Используйте /fav после /hadith.",
        En => "⭐ No favourites yet. Use /fav after /hadith.",
        Tr => "⭐ Henüz favori yok. /hadith sonrası /fav kullanın.",
    }
}

pub fn unfav_ok(lang: Language, id: u32) -> String {
    match lang {
        Ru => format!("🗑 Хадис #{id} удалён из избранного."),
        En => format!("🗑 Hadith #{id} removed from favourites."),
        Tr => format!("🗑 #{id} numaralı hadis favorilerden silindi."),
    }
}

pub fn unfav_bad(lang: Language, id: u32) -> String {
    match lang {
        Ru => format!("❓ Нет хадиса #{id} в избранном."),
        En => format!("❓ No hadith #{id} in favourites."),
        Tr => format!("❓ Favorilerde #{id} yok."),
    }
}

pub fn unfav_usage(lang: Language) -> &'static str {
    match lang {
        Ru => "Использование: <code>/unfav 1</code>",
        En => "Usage: <code>/unfav 1</code>",
        Tr => "Kullanım: <code>/unfav 1</code>",
    }
}

pub fn daily_set(lang: Language, time: &str) -> String {
    match lang {
        Ru => format!("🌅 Ежедневный хадис установлен на <b>{time}</b>."),
        En => format!("🌅 Daily hadith set for <b>{time}</b>."),
        Tr => format!("🌅 Günlük hadis <b>{time}</b> olarak ayarlandı."),
    }
}

pub fn daily_off(lang: Language) -> &'static str {
    match lang {
        Ru => "🌅 Ежедневный хадис отключён.",
        En => "🌅 Daily hadith disabled.",
        Tr => "🌅 Günlük hadis devre dışı bırakıldı.",
    }
}

pub fn daily_none(lang: Language) -> &'static str {
    match lang {
        Ru => "ℹ️ Ежедневный хадис не настроен. <code>/daily HH:MM</code>",
        En => "ℹ️ Daily hadith not set. Use <code>/daily HH:MM</code>",
        Tr => "ℹ️ Günlük hadis ayarlanmamış. <code>/daily SS:DD</code>",
    }
}

pub fn daily_current(lang: Language, time: &str) -> String {
    match lang {
        Ru => format!("🌅 Ежедневный хадис: <b>{time}</b>."),
        En => format!("🌅 Daily hadith: <b>{time}</b>."),
        Tr => format!("🌅 Günlük hadis: <b>{time}</b>."),
    }
}

pub fn remind_ok(lang: Language, time: &str) -> String {
    match lang {
        Ru => format!("🔔 Напоминание добавлено: <b>{time}</b>."),
        En => format!("🔔 Reminder added: <b>{time}</b>."),
        Tr => format!("🔔 Hatırlatma eklendi: <b>{time}</b>."),
    }
}

pub fn remind_dup(lang: Language, time: &str) -> String {
    match lang {
        Ru => format!("🔔 Напоминание на {time} уже есть."),
        En => format!("🔔 Reminder at {time} already exists."),
        Tr => format!("🔔 {time} için zaten hatırlatma var."),
    }
}

pub fn remind_usage(lang: Language) -> &'static str {
    match lang {
        Ru => "Формат: <code>/remind HH:MM</code>",
        En => "Format: <code>/remind HH:MM</code>",
        Tr => "Format: <code>/remind SS:DD</code>",
    }
}

pub fn reminders_title(lang: Language) -> &'static str {
    match lang {
        Ru => "🔔 <b>Ваши напоминания:</b>",
        En => "🔔 <b>Your reminders:</b>",
        Tr => "🔔 <b>Hatırlatmalarınız:</b>",
    }
}

pub fn reminders_empty(lang: Language) -> &'static str {
    match lang {
        Ru => "🔕 Нет напоминаний. <code>/remind HH:MM</code>",
        En => "🔕 No reminders. Use <code>/remind HH:MM</code>",
        Tr => "🔕 Hatırlatma yok. <code>/remind SS:DD</code> kullanın.",
    }
}

pub fn delremind_ok(lang: Language, index: usize) -> String {
    match lang {
        Ru => format!("🗑 Напоминание #{index} удалено."),
        En => format!("🗑 Reminder #{index} removed."),
        Tr => format!("🗑 #{index} hatırlatması silindi."),
    }
}

pub fn delremind_bad(lang: Language, index: usize) -> String {
    match lang {
        Ru => format!("❓ Нет напоминания #{index}."),
        En => format!("❓ No reminder #{index}."),
        Tr => format!("❓ #{index} hatırlatması yok."),
    }
}

pub fn delremind_help(lang: Language) -> &'static str {
    match lang {
        Ru => "<code>/delremind 1</code> или <code>/delremind all</code>",
        En => "<code>/delremind 1</code> or <code>/delremind all</code>",
        Tr => "<code>/delremind 1</code> veya <code>/delremind all</code>",
    }
}

pub fn deleted_all(lang: Language, count: usize) -> String {
    match lang {
        Ru => format!("🗑 Все напоминания удалены ({count})."),
        En => format!("🗑 All reminders deleted ({count})."),
        Tr => format!("🗑 Tüm hatırlatmalar silindi ({count})."),
    }
}

pub fn bookmark_ok(lang: Language, reference: &str) -> String {
    match lang {
        Ru => format!("🔖 Закладка добавлена: <b>{reference}</b>."),
        En => format!("🔖 Bookmark added: <b>{reference}</b>."),
        Tr => format!("🔖 Yer imi eklendi: <b>{reference}</b>."),
    }
}

pub fn bookmark_dup(lang: Language) -> &'static str {
    match lang {
        Ru => "🔖 Такая закладка уже есть.",
        En => "🔖 That bookmark already exists.",
        Tr => "🔖 Bu yer imi zaten var.",
    }
}

pub fn bookmark_usage(lang: Language) -> &'static str {
    match lang {
        Ru => "Формат: <code>/bookmark 2:255</code> (сура:аят)",
        En => "Format: <code>/bookmark 2:255</code> (surah:ayah)",
        Tr => "Format: <code>/bookmark 2:255</code> (sure:ayet)",
    }
}

pub fn bookmarks_title(lang: Language) -> &'static str {
    match lang {
        Ru => "🔖 <b>Ваши закладки:</b>",
        En => "🔖 <b>Your bookmarks:</b>",
        Tr => "🔖 <b>Yer imleriniz:</b>",
    }
}

pub fn bookmarks_empty(lang: Language) -> &'static str {
    match lang {
        Ru => "🔖 Закладок нет. <code>/bookmark 2:255</code>",
        En => "🔖 No bookmarks. Use <code>/bookmark 2:255</code>",
        Tr => "🔖 Yer imi yok. <code>/bookmark 2:255</code> kullanın.",
    }
}

pub fn unbookmark_ok(lang: Language, reference: &str) -> String {
    match lang {
        Ru => format!("🗑 Закладка {reference} удалена."),
        En => format!("🗑 Bookmark {reference} removed."),
        Tr => format!("🗑 {reference} yer imi silindi."),
    }
}

pub fn unbookmark_bad(lang: Language, reference: &str) -> String {
    match lang {
        Ru => format!("❓ Закладки {reference} нет."),
        En => format!("❓ No bookmark {reference}."),
        Tr => format!("❓ {reference} yer imi yok."),
    }
}

pub fn streak_report(lang: Language, report: &StreakReport) -> String {
    let today = match (lang, report.active_today) {
        (Ru, true) => "Сегодня вы уже читали ✅",
        (Ru, false) => "Сегодня вы ещё не читали",
        (En, true) => "You have read today ✅",
        (En, false) => "You have not read today yet",
        (Tr, true) => "Bugün okudunuz ✅",
        (Tr, false) => "Bugün henüz okumadınız",
    };
    match lang {
        Ru => format!(
            "🔥 Серия: <b>{}</b> дн.\n🏆 Рекорд: <b>{}</b> дн.\n{}",
            report.current, report.max, today
        ),
        En => format!(
            "🔥 Streak: <b>{}</b> days\n🏆 Best: <b>{}</b> days\n{}",
            report.current, report.max, today
        ),
        Tr => format!(
            "🔥 Seri: <b>{}</b> gün\n🏆 Rekor: <b>{}</b> gün\n{}",
            report.current, report.max, today
        ),
    }
}

pub fn progress_report(lang: Language, read: usize, total: u32) -> String {
    let percentage = if total > 0 {
        (read as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    let bar = progress_bar(percentage, 20);
    match lang {
        Ru => format!("📊 Прочитано: <b>{read}</b> из {total}\n{bar}"),
        En => format!("📊 Read: <b>{read}</b> of {total}\n{bar}"),
        Tr => format!("📊 Okunan: <b>{read}</b> / {total}\n{bar}"),
    }
}

/// Visual progress bar, e.g. `[████░░░░░░░░░░░░░░░░] 20.0%`.
pub fn progress_bar(percentage: f64, length: usize) -> String {
    let clamped = percentage.clamp(0.0, 100.0);
    let filled = ((length as f64) * clamped / 100.0) as usize;
    let bar: String = "█".repeat(filled) + &"░".repeat(length - filled);
    format!("[{bar}] {clamped:.1}%")
}

pub fn lang_set(lang: Language) -> &'static str {
    match lang {
        Ru => "🌍 Язык изменён.",
        En => "🌍 Language changed.",
        Tr => "🌍 Dil değiştirildi.",
    }
}

pub fn bad_time(lang: Language) -> &'static str {
    match lang {
        Ru => "⏰ Формат времени: <code>HH:MM</code>",
        En => "⏰ Time format: <code>HH:MM</code>",
        Tr => "⏰ Saat formatı: <code>SS:DD</code>",
    }
}

pub fn more_button(lang: Language) -> &'static str {
    match lang {
        Ru => "📖 Ещё хадис",
        En => "📖 Another hadith",
        Tr => "📖 Başka hadis",
    }
}

pub fn fav_button(lang: Language) -> &'static str {
    match lang {
        Ru => "⭐ В избранное",
        En => "⭐ Save to favourites",
        Tr => "⭐ Favorilere ekle",
    }
}

pub fn transient_error(lang: Language) -> &'static str {
    match lang {
        Ru => "⚠️ Временная ошибка. Попробуйте ещё раз чуть позже.",
        En => "⚠️ Temporary error. Please try again shortly.",
        Tr => "⚠️ Geçici bir hata oluştu. Lütfen biraz sonra tekrar deneyin.",
    }
}

pub fn already_exists(lang: Language) -> &'static str {
    match lang {
        Ru => "ℹ️ Такая запись уже есть.",
        En => "ℹ️ That entry already exists.",
        Tr => "ℹ️ Bu kayıt zaten var.",
    }
}

pub fn invalid_input(lang: Language) -> &'static str {
    match lang {
        Ru => "❓ Неверный формат. См. /help.",
        En => "❓ Invalid format. See /help.",
        Tr => "❓ Geçersiz format. Bkz. /help.",
    }
}

/// Boundary conversion: every error becomes a user-visible message.
pub fn error_text(lang: Language, error: &BotError) -> &'static str {
    match error {
        BotError::NotFound => no_content(lang),
        BotError::Duplicate => already_exists(lang),
        BotError::Validation(_) => invalid_input(lang),
        _ => transient_error(lang),
    }
}

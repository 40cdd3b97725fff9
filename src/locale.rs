//! User-facing message catalog.

use serde::{Deserialize, Serialize};

/// Display language for messages surfaced to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Tr,
}

/// Messages the client shows to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    LoginFailed,
    RegisterFailed,
    InvalidServerResponse,
}

impl Locale {
    pub fn text(self, text: Text) -> &'static str {
        match (self, text) {
            (Locale::En, Text::LoginFailed) => {
                "Login failed. Please check your username and password."
            }
            (Locale::Tr, Text::LoginFailed) => {
                "Giriş başarısız. Lütfen kullanıcı adı ve şifrenizi kontrol edin."
            }
            (Locale::En, Text::RegisterFailed) => {
                "Registration failed. Please try a different username or try again later."
            }
            (Locale::Tr, Text::RegisterFailed) => {
                "Kayıt başarısız. Lütfen farklı bir kullanıcı adı deneyin veya daha sonra tekrar deneyin."
            }
            (Locale::En, Text::InvalidServerResponse) => "Invalid response from server",
            (Locale::Tr, Text::InvalidServerResponse) => "Sunucudan geçersiz yanıt alındı",
        }
    }
}

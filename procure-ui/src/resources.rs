//! Static interface resources
//!
//! Translation tables and tender presets. Built once at startup with
//! [`Resources::builtin`] and handed to the workspace as `Arc<Resources>`;
//! nothing here is mutated afterwards.

use procure_common::api::PredictionForm;
use procure_common::Error;
use std::fmt;
use std::str::FromStr;

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lang {
    #[default]
    Pl,
    En,
    Ua,
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::Pl, Lang::En, Lang::Ua];

    /// Key used in the CPV dictionary records
    pub fn code(self) -> &'static str {
        match self {
            Lang::Pl => "pl",
            Lang::En => "en",
            Lang::Ua => "ua",
        }
    }

    /// Parse a language code, accepting `uk` as Ukrainian
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "pl" => Some(Lang::Pl),
            "en" => Some(Lang::En),
            "ua" | "uk" => Some(Lang::Ua),
            _ => None,
        }
    }

    /// Placeholder shown while no description is available for a code
    pub fn description_pending(self) -> &'static str {
        match self {
            Lang::En => "Description coming soon for this CPV.",
            Lang::Ua => "Опис для цього CPV невдовзі.",
            Lang::Pl => "Opis dla tego CPV w przygotowaniu.",
        }
    }
}

impl FromStr for Lang {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lang::from_code(s).ok_or_else(|| {
            Error::InvalidInput(format!("Unsupported language '{}' (expected pl, en or ua)", s))
        })
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code().to_uppercase())
    }
}

/// Interface strings for one language
#[derive(Debug)]
pub struct Messages {
    pub hero_title: &'static str,
    pub hero_lead: &'static str,
    pub model_label: &'static str,
    pub categories_label: &'static str,
    pub features_label: &'static str,
    pub form_title: &'static str,
    pub value_label: &'static str,
    pub cae_label: &'static str,
    pub nuts_label: &'static str,
    pub type_label: &'static str,
    pub submit_idle: &'static str,
    pub submit_loading: &'static str,
    pub presets_title: &'static str,
    pub preset_labels: [&'static str; 3],
    pub result_title: &'static str,
    pub loading_title: &'static str,
    pub loading_subtitle: &'static str,
    pub top_result: &'static str,
    pub confidence: &'static str,
    pub table_title: &'static str,
    pub th_index: &'static str,
    pub th_cpv: &'static str,
    pub th_prob: &'static str,
    pub details_summary: &'static str,
    pub placeholder_title: &'static str,
    pub placeholder_subtitle: &'static str,
    pub prediction_failed: &'static str,
    pub metadata_failed: &'static str,
    pub confidence_high: &'static str,
    pub confidence_medium: &'static str,
    pub confidence_low: &'static str,
    pub status_title: &'static str,
    pub status_healthy: &'static str,
    pub status_unavailable: &'static str,
    pub status_checking: &'static str,
    pub status_prediction_time: &'static str,
    pub algorithm_label: &'static str,
    pub codes_label: &'static str,
    pub docs_title: &'static str,
    pub docs_lead: &'static str,
}

const PL: Messages = Messages {
    hero_title: "ProcureAI",
    hero_lead: "Klasyfikacja zamówień publicznych wspierana AI. Wprowadź podstawowe parametry przetargu, a my zaproponujemy najbardziej prawdopodobne kody CPV wraz z pewnością modelu.",
    model_label: "Model",
    categories_label: "Kategorie",
    features_label: "Cechy",
    form_title: "Konfiguracja zapytania",
    value_label: "Wartość kontraktu (EUR)",
    cae_label: "Zamawiający (CAE_NAME)",
    nuts_label: "Lokalizacja (NUTS)",
    type_label: "Typ kontraktu",
    submit_idle: "Przewidź kod CPV",
    submit_loading: "Przewidywanie...",
    presets_title: "Gotowe scenariusze:",
    preset_labels: ["Usługi · 50k €", "Dostawy · 150k €", "Roboty · 500k €"],
    result_title: "Najlepsze dopasowanie CPV",
    loading_title: "Analizujemy sygnały...",
    loading_subtitle: "Model oblicza rozkład prawdopodobieństw dla kodów CPV.",
    top_result: "Top wynik",
    confidence: "Pewność",
    table_title: "Ranking Top 5",
    th_index: "#",
    th_cpv: "CPV",
    th_prob: "Prawdopodobieństwo",
    details_summary: "Dane wejściowe",
    placeholder_title: "Wprowadź dane i kliknij „Przewidź”",
    placeholder_subtitle: "Zobaczysz tutaj ranking kodów CPV wraz z pewnością modelu.",
    prediction_failed: "Błąd predykcji",
    metadata_failed: "Błąd ładowania model-info",
    confidence_high: "Wysoka pewność",
    confidence_medium: "Średnia pewność",
    confidence_low: "Niższa pewność",
    status_title: "Stan usługi predykcyjnej",
    status_healthy: "Działa",
    status_unavailable: "Niedostępna",
    status_checking: "Sprawdzanie...",
    status_prediction_time: "Średni czas predykcji",
    algorithm_label: "Algorytm",
    codes_label: "Kody CPV",
    docs_title: "Integracja z modelem CPV",
    docs_lead: "Minimalne REST API do wykorzystania modelu klasyfikacji CPV w Twoich systemach.",
};

const EN: Messages = Messages {
    hero_title: "ProcureAI CPV Predictor",
    hero_lead: "AI-powered public procurement classification. Provide tender parameters and we will suggest the most likely CPV codes with confidence.",
    model_label: "Model",
    categories_label: "Categories",
    features_label: "Features",
    form_title: "Query configuration",
    value_label: "Contract value (EUR)",
    cae_label: "Contracting authority (CAE_NAME)",
    nuts_label: "Location (NUTS)",
    type_label: "Contract type",
    submit_idle: "Predict CPV code",
    submit_loading: "Predicting...",
    presets_title: "Ready scenarios:",
    preset_labels: ["Services · 50k €", "Supplies · 150k €", "Works · 500k €"],
    result_title: "Best CPV match",
    loading_title: "Crunching signals...",
    loading_subtitle: "The model computes probability distribution for CPV codes.",
    top_result: "Top result",
    confidence: "Confidence",
    table_title: "Top 5 ranking",
    th_index: "#",
    th_cpv: "CPV",
    th_prob: "Probability",
    details_summary: "Input data",
    placeholder_title: "Enter data and run “submit”",
    placeholder_subtitle: "You will see the CPV ranking with model confidence here.",
    prediction_failed: "Prediction failed",
    metadata_failed: "Could not load model information",
    confidence_high: "High confidence",
    confidence_medium: "Medium confidence",
    confidence_low: "Lower confidence",
    status_title: "Prediction service status",
    status_healthy: "Healthy",
    status_unavailable: "Unavailable",
    status_checking: "Checking...",
    status_prediction_time: "Avg prediction time",
    algorithm_label: "Algorithm",
    codes_label: "CPV codes",
    docs_title: "CPV model integration",
    docs_lead: "A minimal REST API for using the CPV classification model in your systems.",
};

const UA: Messages = Messages {
    hero_title: "ProcureAI CPV Predictor",
    hero_lead: "Класифікація державних закупівель за допомогою AI. Вкажіть параметри тендеру, і ми запропонуємо найімовірніші коди CPV разом з упевненістю моделі.",
    model_label: "Модель",
    categories_label: "Категорії",
    features_label: "Ознаки",
    form_title: "Налаштування запиту",
    value_label: "Вартість контракту (EUR)",
    cae_label: "Замовник (CAE_NAME)",
    nuts_label: "Локація (NUTS)",
    type_label: "Тип контракту",
    submit_idle: "Передбачити код CPV",
    submit_loading: "Обробка...",
    presets_title: "Готові сценарії:",
    preset_labels: ["Послуги · 50k €", "Поставки · 150k €", "Роботи · 500k €"],
    result_title: "Найкраще співпадіння CPV",
    loading_title: "Аналізуємо сигнали...",
    loading_subtitle: "Модель розраховує розподіл ймовірностей для кодів CPV.",
    top_result: "Топ результат",
    confidence: "Впевненість",
    table_title: "Рейтинг Top 5",
    th_index: "#",
    th_cpv: "CPV",
    th_prob: "Ймовірність",
    details_summary: "Вхідні дані",
    placeholder_title: "Введіть дані та виконайте «submit»",
    placeholder_subtitle: "Тут з’явиться рейтинг CPV із впевненістю моделі.",
    prediction_failed: "Помилка передбачення",
    metadata_failed: "Не вдалося завантажити інформацію про модель",
    confidence_high: "Висока впевненість",
    confidence_medium: "Середня впевненість",
    confidence_low: "Нижча впевненість",
    status_title: "Стан сервісу передбачень",
    status_healthy: "Працює",
    status_unavailable: "Недоступний",
    status_checking: "Перевірка...",
    status_prediction_time: "Середній час передбачення",
    algorithm_label: "Алгоритм",
    codes_label: "Коди CPV",
    docs_title: "Інтеграція з моделлю CPV",
    docs_lead: "Мінімальний REST API для використання моделі класифікації CPV у ваших системах.",
};

/// Ready-made tender scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    /// 1-based identifier used by the `preset` command
    pub id: u8,
    pub form: PredictionForm,
}

/// Immutable interface resources shared by the workspace and renderer
#[derive(Debug)]
pub struct Resources {
    pl: Messages,
    en: Messages,
    ua: Messages,
    presets: Vec<Preset>,
}

impl Resources {
    /// Built-in translations and presets
    pub fn builtin() -> Self {
        Self {
            pl: PL,
            en: EN,
            ua: UA,
            presets: vec![
                Preset {
                    id: 1,
                    form: PredictionForm::new(50_000.0, "Urząd Miasta Warszawa", "PL911", "SERVICES"),
                },
                Preset {
                    id: 2,
                    form: PredictionForm::new(150_000.0, "Szpital Miejski", "PL911", "SUPPLIES"),
                },
                Preset {
                    id: 3,
                    form: PredictionForm::new(500_000.0, "Urząd Miasta", "PL911", "WORKS"),
                },
            ],
        }
    }

    pub fn messages(&self, lang: Lang) -> &Messages {
        match lang {
            Lang::Pl => &self.pl,
            Lang::En => &self.en,
            Lang::Ua => &self.ua,
        }
    }

    pub fn preset(&self, id: u8) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }
}

use chrono::NaiveDate;
use crates::domain::value_objects::enums::locales::Locale;

/// Locale-specific sentences. The template structure and the JSON contracts
/// are shared across languages.
struct Wording {
    extraction_role: &'static str,
    extraction_task: &'static str,
    extraction_text_label: &'static str,
    extraction_closing: &'static str,
    reminder_role: &'static str,
    reminder_task: &'static str,
    reminder_details: &'static str,
    reminder_labels: ReminderLabels,
    reminder_closing: &'static str,
    no_due_date: &'static str,
    insights_role: &'static str,
    insights_task: &'static str,
    insights_data_label: &'static str,
    insights_closing: &'static str,
    insights_example: [&'static str; 2],
}

struct ReminderLabels {
    client_name: &'static str,
    invoice_number: &'static str,
    amount_due: &'static str,
    due_date: &'static str,
}

const ENGLISH: Wording = Wording {
    extraction_role: "You are an expert invoice data extraction AI.",
    extraction_task: "Analyze the following text and extract the relevant invoice details in JSON format. The output MUST be a valid JSON object with the following fields:",
    extraction_text_label: "Here is the text to parse:",
    extraction_closing: "Extract the data and provide the JSON output only, without any additional text or explanation.",
    reminder_role: "You are a professional and polite accounting assistant.",
    reminder_task: "Write a friendly reminder email to a client about an overdue or upcoming invoice payment.",
    reminder_details: "Use the following details to personalize the email:",
    reminder_labels: ReminderLabels {
        client_name: "Client Name",
        invoice_number: "Invoice Number",
        amount_due: "Amount Due",
        due_date: "Due Date",
    },
    reminder_closing: "The tone should be friendly and clear. Keep it concise. Start the email with \"Subject:\".",
    no_due_date: "not specified",
    insights_role: "You are a friendly and insightful financial analyst for small business owners.",
    insights_task: "Based on the following summary of their invoice data, provide 2-3 concise and actionable insights. The insights should be encouraging and helpful. Do not just repeat the data. For example, if there is a high outstanding amount, suggest sending reminders. If revenue is high, be encouraging.",
    insights_data_label: "Data Summary:",
    insights_closing: "Return your response as a valid JSON object with a single key \"insights\" which is an array of strings, and nothing else.",
    insights_example: [
        "Your revenue is looking strong this month!",
        "You have 5 overdue invoices. Consider sending reminders to get paid faster.",
    ],
};

const INDONESIAN: Wording = Wording {
    extraction_role: "Anda adalah AI ahli ekstraksi data faktur.",
    extraction_task: "Analisis teks berikut dan ekstrak detail faktur yang relevan dalam format JSON. Keluaran HARUS berupa objek JSON yang valid dengan field berikut:",
    extraction_text_label: "Berikut teks yang harus diproses:",
    extraction_closing: "Ekstrak datanya dan berikan keluaran JSON saja, tanpa teks atau penjelasan tambahan.",
    reminder_role: "Anda adalah asisten akuntansi yang profesional dan sopan.",
    reminder_task: "Tulis email pengingat yang ramah kepada klien tentang pembayaran faktur yang sudah jatuh tempo atau akan segera jatuh tempo.",
    reminder_details: "Gunakan detail berikut untuk mempersonalisasi email:",
    reminder_labels: ReminderLabels {
        client_name: "Nama Klien",
        invoice_number: "Nomor Faktur",
        amount_due: "Jumlah Tagihan",
        due_date: "Tanggal Jatuh Tempo",
    },
    reminder_closing: "Gunakan nada yang ramah dan jelas. Buat singkat. Awali email dengan \"Subject:\".",
    no_due_date: "tidak ditentukan",
    insights_role: "Anda adalah analis keuangan yang ramah dan jeli untuk pemilik usaha kecil.",
    insights_task: "Berdasarkan ringkasan data faktur berikut, berikan 2-3 wawasan yang singkat dan dapat ditindaklanjuti. Wawasan harus memotivasi dan membantu. Jangan hanya mengulang data. Misalnya, jika jumlah tagihan tertunggak tinggi, sarankan untuk mengirim pengingat. Jika pendapatan tinggi, berikan semangat.",
    insights_data_label: "Ringkasan Data:",
    insights_closing: "Kembalikan respons sebagai objek JSON yang valid dengan satu kunci \"insights\" berupa array string, tanpa teks lain.",
    insights_example: [
        "Pendapatan Anda bulan ini terlihat kuat!",
        "Anda memiliki 5 faktur yang jatuh tempo. Pertimbangkan untuk mengirim pengingat agar cepat dibayar.",
    ],
};

const EXTRACTION_SCHEMA: &str = r#"{
    "clientName": "string",
    "email": "string (if available)",
    "address": "string (if available)",
    "items": [
        {
            "name": "string",
            "quantity": number,
            "unitPrice": number
        }
    ]
}"#;

fn wording(locale: Locale) -> &'static Wording {
    match locale {
        Locale::En => &ENGLISH,
        Locale::Id => &INDONESIAN,
    }
}

/// Values interpolated into the reminder prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderContext {
    pub client_name: String,
    pub invoice_number: String,
    pub amount_due: f64,
    pub due_date: Option<NaiveDate>,
}

pub fn invoice_extraction_prompt(locale: Locale, text: &str) -> String {
    let w = wording(locale);
    format!(
        "{role} {task}\n{schema}\n\n{label}\n--- TEXT START ---\n{text}\n--- TEXT END ---\n\n{closing}",
        role = w.extraction_role,
        task = w.extraction_task,
        schema = EXTRACTION_SCHEMA,
        label = w.extraction_text_label,
        text = text,
        closing = w.extraction_closing,
    )
}

pub fn reminder_prompt(locale: Locale, context: &ReminderContext) -> String {
    let w = wording(locale);
    let labels = &w.reminder_labels;
    let due_date = context
        .due_date
        .map(|date| date.format("%d %b %Y").to_string())
        .unwrap_or_else(|| w.no_due_date.to_string());

    format!(
        "{role} {task}\n\n{details}\n- {l_client}: {client}\n- {l_number}: {number}\n- {l_amount}: {amount:.2}\n- {l_due}: {due}\n\n{closing}",
        role = w.reminder_role,
        task = w.reminder_task,
        details = w.reminder_details,
        l_client = labels.client_name,
        client = context.client_name,
        l_number = labels.invoice_number,
        number = context.invoice_number,
        l_amount = labels.amount_due,
        amount = context.amount_due,
        l_due = labels.due_date,
        due = due_date,
        closing = w.reminder_closing,
    )
}

pub fn dashboard_insights_prompt(locale: Locale, digest: &str) -> String {
    let w = wording(locale);
    let example = serde_json::json!({ "insights": w.insights_example });

    format!(
        "{role} {task}\n\n{label}\n{digest}\n\n{closing}\nExample: {example}",
        role = w.insights_role,
        task = w.insights_task,
        label = w.insights_data_label,
        digest = digest,
        closing = w.insights_closing,
        example = example,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ReminderContext {
        ReminderContext {
            client_name: "Acme Corp".to_string(),
            invoice_number: "INV-042".to_string(),
            amount_due: 330.0,
            due_date: NaiveDate::from_ymd_opt(2025, 2, 14),
        }
    }

    #[test]
    fn extraction_prompt_embeds_text_and_schema() {
        let prompt = invoice_extraction_prompt(Locale::En, "2 logos at $150");

        assert!(prompt.contains("--- TEXT START ---\n2 logos at $150\n--- TEXT END ---"));
        assert!(prompt.contains("\"unitPrice\": number"));
    }

    #[test]
    fn locales_share_the_contract_but_not_the_wording() {
        let en = invoice_extraction_prompt(Locale::En, "text");
        let id = invoice_extraction_prompt(Locale::Id, "text");

        assert_ne!(en, id);
        assert!(id.contains(EXTRACTION_SCHEMA));
        assert!(en.contains(EXTRACTION_SCHEMA));
    }

    #[test]
    fn reminder_prompt_formats_amount_and_date() {
        let prompt = reminder_prompt(Locale::En, &context());

        assert!(prompt.contains("- Client Name: Acme Corp"));
        assert!(prompt.contains("- Invoice Number: INV-042"));
        assert!(prompt.contains("- Amount Due: 330.00"));
        assert!(prompt.contains("- Due Date: 14 Feb 2025"));
    }

    #[test]
    fn reminder_prompt_without_due_date() {
        let mut context = context();
        context.due_date = None;

        let prompt = reminder_prompt(Locale::Id, &context);
        assert!(prompt.contains("- Tanggal Jatuh Tempo: tidak ditentukan"));
    }

    #[test]
    fn insights_prompt_carries_digest_and_example() {
        let prompt = dashboard_insights_prompt(Locale::En, "- Total Number of Invoices: 3");

        assert!(prompt.contains("- Total Number of Invoices: 3"));
        assert!(prompt.contains("\"insights\""));
    }
}

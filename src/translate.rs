pub const UNKNOWN_FEATURE: &str = "Desconhecido";
pub const NO_RISK_FACTOR: &str = "Nenhum fator de risco relevante identificado";
pub const NO_RETENTION_FACTOR: &str = "Nenhum fator relevante identificado";

const PIPELINE_PREFIXES: &[&str] = &["num__", "cat__"];

pub fn strip_prefixes(mut token: &str) -> &str {
    loop {
        match PIPELINE_PREFIXES
            .iter()
            .find_map(|prefix| token.strip_prefix(prefix))
        {
            Some(rest) => token = rest,
            None => return token,
        }
    }
}

/// Turns a raw model feature token into its dashboard display name. Absence
/// markers (empty, `"N/A"`, or nothing but pipeline prefixes) map to the
/// unknown sentinel; tokens without a translation pass through stripped.
pub fn translate(raw: &str) -> String {
    if raw.is_empty() || raw == "N/A" {
        return UNKNOWN_FEATURE.to_string();
    }
    let token = strip_prefixes(raw);
    if token.is_empty() {
        return UNKNOWN_FEATURE.to_string();
    }
    match known_translation(token) {
        Some(display) => display.to_string(),
        None => token.to_string(),
    }
}

fn known_translation(token: &str) -> Option<&'static str> {
    let display = match token {
        "gender" => "Gênero",
        "gender_Male" => "Gênero Masculino",
        "gender_Female" => "Gênero Feminino",
        "age" | "Age" => "Idade",
        "country" => "País",
        "country_FR" => "País França",
        "country_IN" => "País Índia",
        "subscription_type" => "Tipo de Assinatura",
        "subscription_type_Student" => "Assinatura Estudante",
        "listening_time" => "Tempo de Escuta",
        "songs_played_per_day" => "Músicas por Dia",
        "skip_rate" => "Taxa de Pulagem",
        "device_type" => "Tipo de Dispositivo",
        "ads_listened_per_week" => "Anúncios por Semana",
        "offline_listening" => "Uso Offline",
        "is_churned" => "Cancelamento (Churn)",
        "songs_per_minute" => "Músicas por Minuto",
        "ad_intensity" => "Intensidade de Anúncios",
        "frustration_index" => "Índice de Frustração",
        "is_heavy_user" => "Usuário Intenso (Heavy)",
        "premium_no_offline" => "Premium sem Offline",
        "premium_sub_month" => "Meses de Assinatura Premium",
        "fav_genre" => "Gênero Favorito",
        _ => return None,
    };
    Some(display)
}

/// Retention action suggested for a risk factor, keyed by display name.
pub fn recommended_action(factor: &str) -> Option<&'static str> {
    let action = match factor {
        "Gênero" => "Ajustar campanhas de marketing para segmentação de gênero específica.",
        "Gênero Masculino" => "Ajustar campanhas de marketing para segmentação de gênero masculino.",
        "Gênero Feminino" => "Ajustar campanhas de marketing para segmentação de gênero feminino.",
        "Idade" => "Oferecer planos adequados à faixa etária (ex: Universitário ou Família).",
        "País" => "Localizar conteúdo e ajustar preços conforme a moeda e região.",
        "País França" => "Localizar conteúdo e ajustar preços conforme a moeda e região francesa.",
        "País Índia" => "Localizar conteúdo e ajustar preços conforme a moeda e região indiana.",
        "Tipo de Assinatura" => "Sugerir upgrade para planos com mais benefícios.",
        "Assinatura Estudante" => {
            "Apresentar planos exclusivos para estudantes e após formar, oferecer descontos no plano premium ou plano pré-pago"
        }
        "Tempo de Escuta" => "Enviar recomendações personalizadas para aumentar o engajamento.",
        "Músicas por Dia" => "Notificações push com novas playlists baseadas no comportamento diário.",
        "Taxa de Pulagem" => "Recalibrar algoritmo de recomendação para reduzir pulos.",
        "Tipo de Dispositivo" => "Otimizar interface e bugs específicos para o hardware do usuário.",
        "Anúncios por Semana" => {
            "Oferecer teste Premium para aliviar interrupções de áudio. Após o teste, oferecer plano premium ou plano pré-pago."
        }
        "Uso Offline" => "Destacar funcionalidades de download em campanhas educacionais.",
        "Músicas por Minuto" => "Sugerir playlists focadas em ritmos específicos.",
        "Intensidade de Anúncios" => {
            "Reduzir carga de anúncios temporariamente para reter o usuário. Ofertar planos sem anúncios."
        }
        "Índice de Frustração" => "Enviar pesquisa de satisfação com cupom de desconto imediato.",
        "Usuário Intenso (Heavy)" => "Oferecer programa de recompensas e acesso antecipado a recursos.",
        "Premium sem Offline" => "Sugerir plano Premium completo com suporte a downloads.",
        _ => return None,
    };
    Some(action)
}

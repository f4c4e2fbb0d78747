use std::collections::HashMap;

/// Lowercase country name (and common alias) to three-letter region code.
const BUILTIN_COUNTRIES: &[(&str, &str)] = &[
    ("afghanistan", "AFG"),
    ("albania", "ALB"),
    ("algeria", "DZA"),
    ("andorra", "AND"),
    ("angola", "AGO"),
    ("antigua and barbuda", "ATG"),
    ("argentina", "ARG"),
    ("armenia", "ARM"),
    ("australia", "AUS"),
    ("austria", "AUT"),
    ("azerbaijan", "AZE"),
    ("bahamas", "BHS"),
    ("bahrain", "BHR"),
    ("bangladesh", "BGD"),
    ("barbados", "BRB"),
    ("belarus", "BLR"),
    ("belgium", "BEL"),
    ("belize", "BLZ"),
    ("benin", "BEN"),
    ("bhutan", "BTN"),
    ("bolivia", "BOL"),
    ("bosnia and herzegovina", "BIH"),
    ("bosnia", "BIH"),
    ("botswana", "BWA"),
    ("brazil", "BRA"),
    ("brunei", "BRN"),
    ("bulgaria", "BGR"),
    ("burkina faso", "BFA"),
    ("burundi", "BDI"),
    ("cambodia", "KHM"),
    ("cameroon", "CMR"),
    ("canada", "CAN"),
    ("cape verde", "CPV"),
    ("central african republic", "CAF"),
    ("chad", "TCD"),
    ("chile", "CHL"),
    ("china", "CHN"),
    ("colombia", "COL"),
    ("comoros", "COM"),
    ("congo", "COG"),
    ("republic of the congo", "COG"),
    ("democratic republic of the congo", "COD"),
    ("congo, democratic republic of", "COD"),
    ("drc", "COD"),
    ("costa rica", "CRI"),
    ("cote d'ivoire", "CIV"),
    ("ivory coast", "CIV"),
    ("croatia", "HRV"),
    ("cuba", "CUB"),
    ("cyprus", "CYP"),
    ("czech republic", "CZE"),
    ("czechia", "CZE"),
    ("denmark", "DNK"),
    ("djibouti", "DJI"),
    ("dominica", "DMA"),
    ("dominican republic", "DOM"),
    ("ecuador", "ECU"),
    ("egypt", "EGY"),
    ("el salvador", "SLV"),
    ("equatorial guinea", "GNQ"),
    ("eritrea", "ERI"),
    ("estonia", "EST"),
    ("eswatini", "SWZ"),
    ("swaziland", "SWZ"),
    ("ethiopia", "ETH"),
    ("fiji", "FJI"),
    ("finland", "FIN"),
    ("france", "FRA"),
    ("gabon", "GAB"),
    ("gambia", "GMB"),
    ("georgia", "GEO"),
    ("germany", "DEU"),
    ("ghana", "GHA"),
    ("greece", "GRC"),
    ("grenada", "GRD"),
    ("guatemala", "GTM"),
    ("guinea", "GIN"),
    ("guinea-bissau", "GNB"),
    ("guyana", "GUY"),
    ("haiti", "HTI"),
    ("honduras", "HND"),
    ("hungary", "HUN"),
    ("iceland", "ISL"),
    ("india", "IND"),
    ("indonesia", "IDN"),
    ("iran", "IRN"),
    ("iraq", "IRQ"),
    ("ireland", "IRL"),
    ("israel", "ISR"),
    ("italy", "ITA"),
    ("jamaica", "JAM"),
    ("japan", "JPN"),
    ("jordan", "JOR"),
    ("kazakhstan", "KAZ"),
    ("kenya", "KEN"),
    ("kiribati", "KIR"),
    ("north korea", "PRK"),
    ("korea, north", "PRK"),
    ("south korea", "KOR"),
    ("korea, south", "KOR"),
    ("korea", "KOR"),
    ("kosovo", "XKX"),
    ("kuwait", "KWT"),
    ("kyrgyzstan", "KGZ"),
    ("laos", "LAO"),
    ("latvia", "LVA"),
    ("lebanon", "LBN"),
    ("lesotho", "LSO"),
    ("liberia", "LBR"),
    ("libya", "LBY"),
    ("liechtenstein", "LIE"),
    ("lithuania", "LTU"),
    ("luxembourg", "LUX"),
    ("madagascar", "MDG"),
    ("malawi", "MWI"),
    ("malaysia", "MYS"),
    ("maldives", "MDV"),
    ("mali", "MLI"),
    ("malta", "MLT"),
    ("marshall islands", "MHL"),
    ("mauritania", "MRT"),
    ("mauritius", "MUS"),
    ("mexico", "MEX"),
    ("micronesia", "FSM"),
    ("moldova", "MDA"),
    ("monaco", "MCO"),
    ("mongolia", "MNG"),
    ("montenegro", "MNE"),
    ("morocco", "MAR"),
    ("mozambique", "MOZ"),
    ("myanmar", "MMR"),
    ("burma", "MMR"),
    ("namibia", "NAM"),
    ("nauru", "NRU"),
    ("nepal", "NPL"),
    ("netherlands", "NLD"),
    ("new zealand", "NZL"),
    ("nicaragua", "NIC"),
    ("niger", "NER"),
    ("nigeria", "NGA"),
    ("north macedonia", "MKD"),
    ("macedonia", "MKD"),
    ("norway", "NOR"),
    ("oman", "OMN"),
    ("pakistan", "PAK"),
    ("palau", "PLW"),
    ("palestine", "PSE"),
    ("panama", "PAN"),
    ("papua new guinea", "PNG"),
    ("paraguay", "PRY"),
    ("peru", "PER"),
    ("philippines", "PHL"),
    ("poland", "POL"),
    ("portugal", "PRT"),
    ("qatar", "QAT"),
    ("romania", "ROU"),
    ("russia", "RUS"),
    ("russian federation", "RUS"),
    ("rwanda", "RWA"),
    ("saint kitts and nevis", "KNA"),
    ("saint lucia", "LCA"),
    ("saint vincent and the grenadines", "VCT"),
    ("samoa", "WSM"),
    ("san marino", "SMR"),
    ("sao tome and principe", "STP"),
    ("saudi arabia", "SAU"),
    ("senegal", "SEN"),
    ("serbia", "SRB"),
    ("seychelles", "SYC"),
    ("sierra leone", "SLE"),
    ("singapore", "SGP"),
    ("slovakia", "SVK"),
    ("slovenia", "SVN"),
    ("solomon islands", "SLB"),
    ("somalia", "SOM"),
    ("south africa", "ZAF"),
    ("south sudan", "SSD"),
    ("spain", "ESP"),
    ("sri lanka", "LKA"),
    ("sudan", "SDN"),
    ("suriname", "SUR"),
    ("sweden", "SWE"),
    ("switzerland", "CHE"),
    ("syria", "SYR"),
    ("taiwan", "TWN"),
    ("tajikistan", "TJK"),
    ("tanzania", "TZA"),
    ("thailand", "THA"),
    ("timor-leste", "TLS"),
    ("east timor", "TLS"),
    ("togo", "TGO"),
    ("tonga", "TON"),
    ("trinidad and tobago", "TTO"),
    ("tunisia", "TUN"),
    ("turkey", "TUR"),
    ("turkiye", "TUR"),
    ("turkmenistan", "TKM"),
    ("tuvalu", "TUV"),
    ("uganda", "UGA"),
    ("ukraine", "UKR"),
    ("united arab emirates", "ARE"),
    ("uae", "ARE"),
    ("united kingdom", "GBR"),
    ("uk", "GBR"),
    ("great britain", "GBR"),
    ("united states", "USA"),
    ("united states of america", "USA"),
    ("usa", "USA"),
    ("us", "USA"),
    ("uruguay", "URY"),
    ("uzbekistan", "UZB"),
    ("vanuatu", "VUT"),
    ("venezuela", "VEN"),
    ("vietnam", "VNM"),
    ("viet nam", "VNM"),
    ("western sahara", "ESH"),
    ("yemen", "YEM"),
    ("zambia", "ZMB"),
    ("zimbabwe", "ZWE"),
];

/// Resolves free-text country names to region codes. The built-in table can be
/// extended or overridden from the `[countries]` section of the config file.
#[derive(Debug, Clone, Default)]
pub struct CountryResolver {
    overrides: HashMap<String, String>,
}

impl CountryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        Self {
            overrides: overrides
                .iter()
                .map(|(name, code)| (normalize(name), code.trim().to_uppercase()))
                .collect(),
        }
    }

    pub fn resolve(&self, country_name: &str) -> Option<String> {
        let key = normalize(country_name);
        if key.is_empty() {
            return None;
        }

        if let Some(code) = self.overrides.get(&key) {
            return Some(code.clone());
        }

        BUILTIN_COUNTRIES
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, code)| code.to_string())
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

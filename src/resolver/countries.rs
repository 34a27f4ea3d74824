// Static country database: ISO 3166 codes, English short name and continent.
//
// Continents: Africa, Antarctica, Asia, Europe, North America, Oceania, South America.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryEntry {
    pub name: &'static str,
    pub iso2: &'static str,
    pub iso3: &'static str,
    pub continent: &'static str,
}

const fn c(
    name: &'static str,
    iso2: &'static str,
    iso3: &'static str,
    continent: &'static str,
) -> CountryEntry {
    CountryEntry {
        name,
        iso2,
        iso3,
        continent,
    }
}

const AF: &str = "Africa";
const AN: &str = "Antarctica";
const AS: &str = "Asia";
const EU: &str = "Europe";
const NA: &str = "North America";
const OC: &str = "Oceania";
const SA: &str = "South America";

pub const COUNTRIES: &[CountryEntry] = &[
    c("Afghanistan", "AF", "AFG", AS),
    c("Aland Islands", "AX", "ALA", EU),
    c("Albania", "AL", "ALB", EU),
    c("Algeria", "DZ", "DZA", AF),
    c("American Samoa", "AS", "ASM", OC),
    c("Andorra", "AD", "AND", EU),
    c("Angola", "AO", "AGO", AF),
    c("Anguilla", "AI", "AIA", NA),
    c("Antarctica", "AQ", "ATA", AN),
    c("Antigua and Barbuda", "AG", "ATG", NA),
    c("Argentina", "AR", "ARG", SA),
    c("Armenia", "AM", "ARM", AS),
    c("Aruba", "AW", "ABW", NA),
    c("Australia", "AU", "AUS", OC),
    c("Austria", "AT", "AUT", EU),
    c("Azerbaijan", "AZ", "AZE", AS),
    c("Bahamas", "BS", "BHS", NA),
    c("Bahrain", "BH", "BHR", AS),
    c("Bangladesh", "BD", "BGD", AS),
    c("Barbados", "BB", "BRB", NA),
    c("Belarus", "BY", "BLR", EU),
    c("Belgium", "BE", "BEL", EU),
    c("Belize", "BZ", "BLZ", NA),
    c("Benin", "BJ", "BEN", AF),
    c("Bermuda", "BM", "BMU", NA),
    c("Bhutan", "BT", "BTN", AS),
    c("Bolivia", "BO", "BOL", SA),
    c("Bonaire, Saint Eustatius and Saba", "BQ", "BES", NA),
    c("Bosnia and Herzegovina", "BA", "BIH", EU),
    c("Botswana", "BW", "BWA", AF),
    c("Bouvet Island", "BV", "BVT", AN),
    c("Brazil", "BR", "BRA", SA),
    c("British Indian Ocean Territory", "IO", "IOT", AS),
    c("British Virgin Islands", "VG", "VGB", NA),
    c("Brunei", "BN", "BRN", AS),
    c("Bulgaria", "BG", "BGR", EU),
    c("Burkina Faso", "BF", "BFA", AF),
    c("Burundi", "BI", "BDI", AF),
    c("Cambodia", "KH", "KHM", AS),
    c("Cameroon", "CM", "CMR", AF),
    c("Canada", "CA", "CAN", NA),
    c("Cape Verde", "CV", "CPV", AF),
    c("Cayman Islands", "KY", "CYM", NA),
    c("Central African Republic", "CF", "CAF", AF),
    c("Chad", "TD", "TCD", AF),
    c("Chile", "CL", "CHL", SA),
    c("China", "CN", "CHN", AS),
    c("Christmas Island", "CX", "CXR", AS),
    c("Cocos Islands", "CC", "CCK", AS),
    c("Colombia", "CO", "COL", SA),
    c("Comoros", "KM", "COM", AF),
    c("Cook Islands", "CK", "COK", OC),
    c("Costa Rica", "CR", "CRI", NA),
    c("Croatia", "HR", "HRV", EU),
    c("Cuba", "CU", "CUB", NA),
    c("Curacao", "CW", "CUW", NA),
    c("Cyprus", "CY", "CYP", EU),
    c("Czech Republic", "CZ", "CZE", EU),
    c("Democratic Republic of the Congo", "CD", "COD", AF),
    c("Denmark", "DK", "DNK", EU),
    c("Djibouti", "DJ", "DJI", AF),
    c("Dominica", "DM", "DMA", NA),
    c("Dominican Republic", "DO", "DOM", NA),
    c("East Timor", "TL", "TLS", OC),
    c("Ecuador", "EC", "ECU", SA),
    c("Egypt", "EG", "EGY", AF),
    c("El Salvador", "SV", "SLV", NA),
    c("Equatorial Guinea", "GQ", "GNQ", AF),
    c("Eritrea", "ER", "ERI", AF),
    c("Estonia", "EE", "EST", EU),
    c("Eswatini", "SZ", "SWZ", AF),
    c("Ethiopia", "ET", "ETH", AF),
    c("Falkland Islands", "FK", "FLK", SA),
    c("Faroe Islands", "FO", "FRO", EU),
    c("Fiji", "FJ", "FJI", OC),
    c("Finland", "FI", "FIN", EU),
    c("France", "FR", "FRA", EU),
    c("French Guiana", "GF", "GUF", SA),
    c("French Polynesia", "PF", "PYF", OC),
    c("French Southern Territories", "TF", "ATF", AN),
    c("Gabon", "GA", "GAB", AF),
    c("Gambia", "GM", "GMB", AF),
    c("Georgia", "GE", "GEO", AS),
    c("Germany", "DE", "DEU", EU),
    c("Ghana", "GH", "GHA", AF),
    c("Gibraltar", "GI", "GIB", EU),
    c("Greece", "GR", "GRC", EU),
    c("Greenland", "GL", "GRL", NA),
    c("Grenada", "GD", "GRD", NA),
    c("Guadeloupe", "GP", "GLP", NA),
    c("Guam", "GU", "GUM", OC),
    c("Guatemala", "GT", "GTM", NA),
    c("Guernsey", "GG", "GGY", EU),
    c("Guinea", "GN", "GIN", AF),
    c("Guinea-Bissau", "GW", "GNB", AF),
    c("Guyana", "GY", "GUY", SA),
    c("Haiti", "HT", "HTI", NA),
    c("Heard Island and McDonald Islands", "HM", "HMD", AN),
    c("Honduras", "HN", "HND", NA),
    c("Hong Kong", "HK", "HKG", AS),
    c("Hungary", "HU", "HUN", EU),
    c("Iceland", "IS", "ISL", EU),
    c("India", "IN", "IND", AS),
    c("Indonesia", "ID", "IDN", AS),
    c("Iran", "IR", "IRN", AS),
    c("Iraq", "IQ", "IRQ", AS),
    c("Ireland", "IE", "IRL", EU),
    c("Isle of Man", "IM", "IMN", EU),
    c("Israel", "IL", "ISR", AS),
    c("Italy", "IT", "ITA", EU),
    c("Ivory Coast", "CI", "CIV", AF),
    c("Jamaica", "JM", "JAM", NA),
    c("Japan", "JP", "JPN", AS),
    c("Jersey", "JE", "JEY", EU),
    c("Jordan", "JO", "JOR", AS),
    c("Kazakhstan", "KZ", "KAZ", AS),
    c("Kenya", "KE", "KEN", AF),
    c("Kiribati", "KI", "KIR", OC),
    c("Kosovo", "XK", "XKX", EU),
    c("Kuwait", "KW", "KWT", AS),
    c("Kyrgyzstan", "KG", "KGZ", AS),
    c("Laos", "LA", "LAO", AS),
    c("Latvia", "LV", "LVA", EU),
    c("Lebanon", "LB", "LBN", AS),
    c("Lesotho", "LS", "LSO", AF),
    c("Liberia", "LR", "LBR", AF),
    c("Libya", "LY", "LBY", AF),
    c("Liechtenstein", "LI", "LIE", EU),
    c("Lithuania", "LT", "LTU", EU),
    c("Luxembourg", "LU", "LUX", EU),
    c("Macao", "MO", "MAC", AS),
    c("Madagascar", "MG", "MDG", AF),
    c("Malawi", "MW", "MWI", AF),
    c("Malaysia", "MY", "MYS", AS),
    c("Maldives", "MV", "MDV", AS),
    c("Mali", "ML", "MLI", AF),
    c("Malta", "MT", "MLT", EU),
    c("Marshall Islands", "MH", "MHL", OC),
    c("Martinique", "MQ", "MTQ", NA),
    c("Mauritania", "MR", "MRT", AF),
    c("Mauritius", "MU", "MUS", AF),
    c("Mayotte", "YT", "MYT", AF),
    c("Mexico", "MX", "MEX", NA),
    c("Micronesia", "FM", "FSM", OC),
    c("Moldova", "MD", "MDA", EU),
    c("Monaco", "MC", "MCO", EU),
    c("Mongolia", "MN", "MNG", AS),
    c("Montenegro", "ME", "MNE", EU),
    c("Montserrat", "MS", "MSR", NA),
    c("Morocco", "MA", "MAR", AF),
    c("Mozambique", "MZ", "MOZ", AF),
    c("Myanmar", "MM", "MMR", AS),
    c("Namibia", "NA", "NAM", AF),
    c("Nauru", "NR", "NRU", OC),
    c("Nepal", "NP", "NPL", AS),
    c("Netherlands", "NL", "NLD", EU),
    c("New Caledonia", "NC", "NCL", OC),
    c("New Zealand", "NZ", "NZL", OC),
    c("Nicaragua", "NI", "NIC", NA),
    c("Niger", "NE", "NER", AF),
    c("Nigeria", "NG", "NGA", AF),
    c("Niue", "NU", "NIU", OC),
    c("Norfolk Island", "NF", "NFK", OC),
    c("North Korea", "KP", "PRK", AS),
    c("North Macedonia", "MK", "MKD", EU),
    c("Northern Mariana Islands", "MP", "MNP", OC),
    c("Norway", "NO", "NOR", EU),
    c("Oman", "OM", "OMN", AS),
    c("Pakistan", "PK", "PAK", AS),
    c("Palau", "PW", "PLW", OC),
    c("Palestine", "PS", "PSE", AS),
    c("Panama", "PA", "PAN", NA),
    c("Papua New Guinea", "PG", "PNG", OC),
    c("Paraguay", "PY", "PRY", SA),
    c("Peru", "PE", "PER", SA),
    c("Philippines", "PH", "PHL", AS),
    c("Pitcairn", "PN", "PCN", OC),
    c("Poland", "PL", "POL", EU),
    c("Portugal", "PT", "PRT", EU),
    c("Puerto Rico", "PR", "PRI", NA),
    c("Qatar", "QA", "QAT", AS),
    c("Republic of the Congo", "CG", "COG", AF),
    c("Reunion", "RE", "REU", AF),
    c("Romania", "RO", "ROU", EU),
    c("Russia", "RU", "RUS", EU),
    c("Rwanda", "RW", "RWA", AF),
    c("Saint Barthelemy", "BL", "BLM", NA),
    c("Saint Helena", "SH", "SHN", AF),
    c("Saint Kitts and Nevis", "KN", "KNA", NA),
    c("Saint Lucia", "LC", "LCA", NA),
    c("Saint Martin", "MF", "MAF", NA),
    c("Saint Pierre and Miquelon", "PM", "SPM", NA),
    c("Saint Vincent and the Grenadines", "VC", "VCT", NA),
    c("Samoa", "WS", "WSM", OC),
    c("San Marino", "SM", "SMR", EU),
    c("Sao Tome and Principe", "ST", "STP", AF),
    c("Saudi Arabia", "SA", "SAU", AS),
    c("Senegal", "SN", "SEN", AF),
    c("Serbia", "RS", "SRB", EU),
    c("Seychelles", "SC", "SYC", AF),
    c("Sierra Leone", "SL", "SLE", AF),
    c("Singapore", "SG", "SGP", AS),
    c("Sint Maarten", "SX", "SXM", NA),
    c("Slovakia", "SK", "SVK", EU),
    c("Slovenia", "SI", "SVN", EU),
    c("Solomon Islands", "SB", "SLB", OC),
    c("Somalia", "SO", "SOM", AF),
    c("South Africa", "ZA", "ZAF", AF),
    c("South Georgia and the South Sandwich Islands", "GS", "SGS", AN),
    c("South Korea", "KR", "KOR", AS),
    c("South Sudan", "SS", "SSD", AF),
    c("Spain", "ES", "ESP", EU),
    c("Sri Lanka", "LK", "LKA", AS),
    c("Sudan", "SD", "SDN", AF),
    c("Suriname", "SR", "SUR", SA),
    c("Svalbard and Jan Mayen", "SJ", "SJM", EU),
    c("Sweden", "SE", "SWE", EU),
    c("Switzerland", "CH", "CHE", EU),
    c("Syria", "SY", "SYR", AS),
    c("Taiwan", "TW", "TWN", AS),
    c("Tajikistan", "TJ", "TJK", AS),
    c("Tanzania", "TZ", "TZA", AF),
    c("Thailand", "TH", "THA", AS),
    c("Togo", "TG", "TGO", AF),
    c("Tokelau", "TK", "TKL", OC),
    c("Tonga", "TO", "TON", OC),
    c("Trinidad and Tobago", "TT", "TTO", NA),
    c("Tunisia", "TN", "TUN", AF),
    c("Turkey", "TR", "TUR", AS),
    c("Turkmenistan", "TM", "TKM", AS),
    c("Turks and Caicos Islands", "TC", "TCA", NA),
    c("Tuvalu", "TV", "TUV", OC),
    c("Uganda", "UG", "UGA", AF),
    c("Ukraine", "UA", "UKR", EU),
    c("United Arab Emirates", "AE", "ARE", AS),
    c("United Kingdom", "GB", "GBR", EU),
    c("United States", "US", "USA", NA),
    c("United States Minor Outlying Islands", "UM", "UMI", OC),
    c("Uruguay", "UY", "URY", SA),
    c("U.S. Virgin Islands", "VI", "VIR", NA),
    c("Uzbekistan", "UZ", "UZB", AS),
    c("Vanuatu", "VU", "VUT", OC),
    c("Vatican", "VA", "VAT", EU),
    c("Venezuela", "VE", "VEN", SA),
    c("Vietnam", "VN", "VNM", AS),
    c("Wallis and Futuna", "WF", "WLF", OC),
    c("Western Sahara", "EH", "ESH", AF),
    c("Yemen", "YE", "YEM", AS),
    c("Zambia", "ZM", "ZMB", AF),
    c("Zimbabwe", "ZW", "ZWE", AF),
];

pub fn find_by_iso3(iso3: &str) -> Option<&'static CountryEntry> {
    COUNTRIES.iter().find(|e| e.iso3 == iso3)
}

pub fn find_by_iso2(iso2: &str) -> Option<&'static CountryEntry> {
    COUNTRIES.iter().find(|e| e.iso2 == iso2)
}

/// Case-insensitive exact name match.
pub fn find_by_name(name: &str) -> Option<&'static CountryEntry> {
    let name = name.trim();
    COUNTRIES.iter().find(|e| e.name.eq_ignore_ascii_case(name))
}

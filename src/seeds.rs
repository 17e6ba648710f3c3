use crate::geo::{GeoSeed, SeedPoint};

const fn city(lat: f64, lng: f64) -> SeedPoint {
    SeedPoint::new(lat, lng, false)
}

const fn border(lat: f64, lng: f64) -> SeedPoint {
    SeedPoint::new(lat, lng, true)
}

pub(crate) const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("ES", "Spain"),
    ("DE", "Germany"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("PL", "Poland"),
    ("NL", "Netherlands"),
    ("AT", "Austria"),
    ("DK", "Denmark"),
    ("UA", "Ukraine"),
    ("RO", "Romania"),
    ("EE", "Estonia"),
    ("LV", "Latvia"),
    ("LT", "Lithuania"),
    ("BG", "Bulgaria"),
    ("GE", "Georgia"),
    ("FI", "Finland"),
    ("CZ", "Czech Republic"),
    ("IT", "Italy"),
    ("US", "United States"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("NZ", "New Zealand"),
    ("JP", "Japan"),
    ("KR", "South Korea"),
    ("CN", "China"),
    ("IN", "India"),
    ("BR", "Brazil"),
    ("MX", "Mexico"),
    ("AE", "United Arab Emirates"),
    ("ZA", "South Africa"),
    ("SE", "Sweden"),
    ("NO", "Norway"),
    ("IE", "Ireland"),
    ("CH", "Switzerland"),
    ("PT", "Portugal"),
    ("GR", "Greece"),
    ("IL", "Israel"),
    ("SG", "Singapore"),
];

pub(crate) static SEEDS: &[GeoSeed] = &[
    GeoSeed {
        country_code: "ES",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            city(40.416775, -3.703790), // Madrid
            city(41.385064, 2.173403), // Barcelona
            city(37.389092, -5.984459), // Seville
            city(39.469907, -0.376288), // Valencia
            city(36.721274, -4.421399), // Malaga
            border(40.970104, -5.663540), // Salamanca
            city(38.707750, -9.136591), // Lisbon
            border(42.237964, -8.720244), // Vigo
            border(37.992240, -1.130654), // Murcia
            city(39.569600, 2.650160), // Palma
            border(40.656635, -4.697438), // Ávila
            border(40.331950, -1.107018), // Teruel
            border(41.656060, -0.877340), // Zaragoza
        ],
    },
    GeoSeed {
        country_code: "DE",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            city(52.520008, 13.404954), // Berlin
            city(48.135124, 11.581981), // Munich
            city(50.110924, 8.682127), // Frankfurt
            city(53.551086, 9.993682), // Hamburg
            city(51.227741, 6.773456), // Dusseldorf
            city(51.514942, 7.466963), // Dortmund
            city(49.006889, 8.403653), // Karlsruhe
            city(49.452103, 11.076665), // Nuremberg
            city(51.339695, 12.373075), // Leipzig
            city(49.791304, 9.953354), // Würzburg
            border(50.775346, 6.083887), // Aachen
            border(50.641200, 10.121810), // Eisenach
            border(50.828710, 8.773710), // Marburg
        ],
    },
    GeoSeed {
        country_code: "US",
        default_radius_meters: 35_000,
        border_radius_meters: 25_000,
        points: &[
            city(40.712776, -74.005974), // New York
            city(34.052235, -118.243683), // Los Angeles
            city(41.878113, -87.629799), // Chicago
            border(29.760427, -95.369804), // Houston
            border(33.748997, -84.387985), // Atlanta
            city(39.952583, -75.165222), // Philadelphia
            city(38.907192, -77.036873), // Washington DC
            border(42.360082, -71.058880), // Boston
            city(32.776665, -96.796989), // Dallas
            city(37.774929, -122.419418), // San Francisco
            city(36.169941, -115.139832), // Las Vegas
            border(25.761681, -80.191788), // Miami
            border(39.768402, -86.158066), // Indianapolis
        ],
    },
    GeoSeed {
        country_code: "CA",
        default_radius_meters: 35_000,
        border_radius_meters: 25_000,
        points: &[
            border(43.651070, -79.347015), // Toronto
            border(45.508888, -73.561668), // Montreal
            border(49.282730, -123.120735), // Vancouver
            city(51.048615, -114.070847), // Calgary
            city(53.544388, -113.490929), // Edmonton
            city(45.421530, -75.697193), // Ottawa
            city(49.895077, -97.138451), // Winnipeg
            border(46.811969, -71.214313), // Quebec City
            city(50.445210, -104.618896), // Regina
        ],
    },
    GeoSeed {
        country_code: "AU",
        default_radius_meters: 40_000,
        border_radius_meters: 30_000,
        points: &[
            border(-33.865143, 151.209900), // Sydney
            border(-37.813629, 144.963058), // Melbourne
            city(-27.469771, 153.025124), // Brisbane
            city(-31.953004, 115.857469), // Perth
            city(-34.928499, 138.600746), // Adelaide
            city(-42.880554, 147.324997), // Hobart
            border(-12.462827, 130.841782), // Darwin
            city(-35.282001, 149.128998), // Canberra
        ],
    },
    GeoSeed {
        country_code: "NZ",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            border(-36.848460, 174.763332), // Auckland
            border(-41.286460, 174.776236), // Wellington
            border(-43.532054, 172.636225), // Christchurch
            city(-45.878761, 170.502792), // Dunedin
            city(-37.787000, 175.279000), // Hamilton
            city(-40.355000, 175.611000), // Palmerston North
        ],
    },
    GeoSeed {
        country_code: "JP",
        default_radius_meters: 25_000,
        border_radius_meters: 15_000,
        points: &[
            border(35.689487, 139.691711), // Tokyo
            border(34.693738, 135.502165), // Osaka
            city(35.011635, 135.768036), // Kyoto
            border(43.066666, 141.350006), // Sapporo
            city(33.590355, 130.401716), // Fukuoka
            city(34.385203, 132.455293), // Hiroshima
            city(38.268223, 140.869415), // Sendai
            city(35.442739, 139.638031), // Yokohama
        ],
    },
    GeoSeed {
        country_code: "KR",
        default_radius_meters: 25_000,
        border_radius_meters: 15_000,
        points: &[
            border(37.566536, 126.977966), // Seoul
            border(35.179554, 129.075642), // Busan
            city(35.871433, 128.601440), // Daegu
            border(37.456257, 126.705208), // Incheon
            city(35.160012, 126.851349), // Gwangju
            city(36.350412, 127.384548), // Daejeon
            city(36.565127, 128.725056), // Andong
        ],
    },
    GeoSeed {
        country_code: "CN",
        default_radius_meters: 40_000,
        border_radius_meters: 30_000,
        points: &[
            border(39.904202, 116.407394), // Beijing
            border(31.230391, 121.473702), // Shanghai
            border(22.396427, 114.109497), // Hong Kong
            city(30.274084, 120.155070), // Hangzhou
            city(23.129110, 113.264381), // Guangzhou
            city(29.563010, 106.551557), // Chongqing
            city(43.825592, 87.616848), // Urumqi
        ],
    },
    GeoSeed {
        country_code: "IN",
        default_radius_meters: 40_000,
        border_radius_meters: 30_000,
        points: &[
            border(28.613939, 77.209023), // New Delhi
            border(19.075983, 72.877655), // Mumbai
            border(12.971599, 77.594566), // Bangalore
            city(22.572645, 88.363892), // Kolkata
            city(13.082680, 80.270721), // Chennai
            city(17.385044, 78.486671), // Hyderabad
            city(18.520430, 73.856743), // Pune
        ],
    },
    GeoSeed {
        country_code: "BR",
        default_radius_meters: 40_000,
        border_radius_meters: 30_000,
        points: &[
            border(-23.550520, -46.633308), // Sao Paulo
            border(-22.906847, -43.172897), // Rio de Janeiro
            border(-15.794229, -47.882166), // Brasilia
            city(-19.916683, -43.934265), // Belo Horizonte
            city(-12.971598, -38.501587), // Salvador
            city(-3.731862, -38.526669), // Fortaleza
            city(-8.054277, -34.881256), // Recife
        ],
    },
    GeoSeed {
        country_code: "MX",
        default_radius_meters: 35_000,
        border_radius_meters: 25_000,
        points: &[
            border(19.432608, -99.133209), // Mexico City
            border(20.666891, -103.392955), // Guadalajara
            city(25.685710, -100.311129), // Monterrey
            border(21.161908, -86.851528), // Cancun
            city(20.967198, -89.591913), // Merida
            city(31.722116, -106.462497), // Ciudad Juarez
        ],
    },
    GeoSeed {
        country_code: "AE",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            border(25.204849, 55.270782), // Dubai
            border(24.466667, 54.366669), // Abu Dhabi
            border(25.317644, 55.524660), // Sharjah
            city(25.785839, 55.973403), // Ras Al Khaimah
            city(25.412439, 55.435543), // Ajman
        ],
    },
    GeoSeed {
        country_code: "ZA",
        default_radius_meters: 35_000,
        border_radius_meters: 25_000,
        points: &[
            border(-33.924870, 18.424055), // Cape Town
            border(-26.204103, 28.047305), // Johannesburg
            border(-29.858681, 31.021839), // Durban
            city(-25.747868, 28.229270), // Pretoria
            city(-33.660297, 25.603434), // Port Elizabeth
        ],
    },
    GeoSeed {
        country_code: "SE",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            border(59.329323, 18.068581), // Stockholm
            border(57.708870, 11.974560), // Gothenburg
            border(55.604980, 13.003822), // Malmö
            city(59.858562, 17.638927), // Uppsala
            city(58.410807, 15.621373), // Linköping
        ],
    },
    GeoSeed {
        country_code: "NO",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            border(59.911491, 10.757933), // Oslo
            border(60.391263, 5.322054), // Bergen
            city(63.430515, 10.395053), // Trondheim
            city(58.969975, 5.733107), // Stavanger
            border(69.649208, 18.955324), // Tromsø
        ],
    },
    GeoSeed {
        country_code: "IE",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            border(53.349805, -6.260310), // Dublin
            border(51.898110, -8.475050), // Cork
            city(53.270668, -9.056790), // Galway
            city(52.668018, -8.630498), // Limerick
            border(54.597285, -5.930120), // Belfast
        ],
    },
    GeoSeed {
        country_code: "CH",
        default_radius_meters: 25_000,
        border_radius_meters: 15_000,
        points: &[
            border(47.376888, 8.541694), // Zurich
            border(46.204391, 6.143158), // Geneva
            city(46.947975, 7.447447), // Bern
            border(47.559601, 7.588576), // Basel
            city(46.994876, 6.931704), // Neuchâtel
        ],
    },
    GeoSeed {
        country_code: "PT",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            border(38.722252, -9.139337), // Lisbon
            border(41.157944, -8.629105), // Porto
            border(37.019356, -7.930440), // Faro
            city(38.571431, -7.913095), // Évora
            city(32.649382, -16.916227), // Funchal
        ],
    },
    GeoSeed {
        country_code: "GR",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            border(37.983917, 23.729360), // Athens
            border(40.640061, 22.944419), // Thessaloniki
            border(35.337496, 25.144896), // Heraklion
            city(39.074208, 21.824312), // Agrinio
            city(39.366487, 22.942764), // Larissa
        ],
    },
    GeoSeed {
        country_code: "IL",
        default_radius_meters: 25_000,
        border_radius_meters: 15_000,
        points: &[
            border(32.085300, 34.781768), // Tel Aviv
            border(31.768319, 35.213710), // Jerusalem
            border(32.794044, 34.989571), // Haifa
            city(31.263139, 34.801763), // Beersheba
            city(32.794241, 35.545310), // Tiberias
        ],
    },
    GeoSeed {
        country_code: "SG",
        default_radius_meters: 15_000,
        border_radius_meters: 10_000,
        points: &[
            border(1.352083, 103.819836), // Singapore City
            border(1.329058, 103.829025), // Tampines
            border(1.371900, 103.893356), // Changi
            city(1.354115, 103.686289), // Jurong East
            city(1.301080, 103.915640), // Marine Parade
        ],
    },
    GeoSeed {
        country_code: "FR",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            city(48.856613, 2.352222), // Paris
            city(43.296482, 5.369780), // Marseille
            city(45.764043, 4.835659), // Lyon
            city(44.837789, -0.579180), // Bordeaux
            city(43.610769, 3.876716), // Montpellier
            city(47.394144, 0.684840), // Tours
            city(47.322047, 5.041480), // Dijon
            city(47.083354, 2.398712), // Bourges
            city(49.258329, 4.031696), // Reims
            city(47.237829, 6.024053), // Besançon
        ],
    },
    GeoSeed {
        country_code: "GB",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            city(51.507351, -0.127758), // London
            city(53.483959, -2.244644), // Manchester
            city(55.953251, -3.188267), // Edinburgh
            city(52.486244, -1.890401), // Birmingham
            city(51.454513, -2.587910), // Bristol
            city(52.205337, 0.121817), // Cambridge
            city(53.800755, -1.549077), // Leeds
            city(52.629729, -1.294835), // Leicester
            city(53.408371, -2.991573), // Liverpool
            city(50.375456, -4.142656), // Plymouth
        ],
    },
    GeoSeed {
        country_code: "PL",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            city(52.229676, 21.012229), // Warsaw
            city(50.064650, 19.944980), // Krakow
            city(51.107883, 17.038538), // Wroclaw
            city(53.428544, 14.552812), // Szczecin
            city(51.759249, 19.455983), // Lodz
            city(52.406374, 16.925168), // Poznan
            city(53.013790, 18.598444), // Torun
            city(54.352025, 18.646638), // Gdansk
            city(50.286264, 18.670850), // Gliwice
            city(53.132489, 23.168840), // Bialystok
        ],
    },
    GeoSeed {
        country_code: "NL",
        default_radius_meters: 30_000,
        border_radius_meters: 20_000,
        points: &[
            city(52.367573, 4.904139), // Amsterdam
            city(51.9225, 4.47917), // Rotterdam
            city(52.078663, 4.288788), // The Hague
            city(50.850340, 5.688889), // Maastricht
            city(52.090737, 5.121420), // Utrecht
            city(51.571914, 5.056642), // Tilburg
            city(51.812565, 5.837226), // Nijmegen
            city(53.219384, 6.566502), // Groningen
            city(51.441642, 5.469722), // Eindhoven
            city(51.985103, 5.898730), // Arnhem
        ],
    },
];

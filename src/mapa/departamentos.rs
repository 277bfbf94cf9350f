//! Centroides de los departamentos de Colombia y resolución de nombres.

use strsim::jaro_winkler;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Departamento {
    pub nombre: &'static str,
    pub latitud: f64,
    pub longitud: f64,
}

const fn dep(nombre: &'static str, latitud: f64, longitud: f64) -> Departamento {
    Departamento { nombre, latitud, longitud }
}

/// Coordenadas aproximadas de la capital de cada departamento.
pub const DEPARTAMENTOS: [Departamento; 33] = [
    dep("Amazonas", -4.2153, -69.9406),
    dep("Antioquia", 6.2442, -75.5812),
    dep("Arauca", 7.0847, -70.7591),
    dep("Atlántico", 10.9685, -74.7813),
    dep("Bogotá D.C.", 4.7110, -74.0721),
    dep("Bolívar", 10.3910, -75.4794),
    dep("Boyacá", 5.5353, -73.3678),
    dep("Caldas", 5.0703, -75.5138),
    dep("Caquetá", 1.6144, -75.6062),
    dep("Casanare", 5.3378, -72.3959),
    dep("Cauca", 2.4448, -76.6147),
    dep("Cesar", 10.4631, -73.2532),
    dep("Chocó", 5.6947, -76.6611),
    dep("Córdoba", 8.7479, -75.8814),
    dep("Cundinamarca", 5.0260, -74.0300),
    dep("Guainía", 3.8653, -67.9239),
    dep("Guaviare", 2.5729, -72.6459),
    dep("Huila", 2.9273, -75.2819),
    dep("La Guajira", 11.5444, -72.9072),
    dep("Magdalena", 11.2408, -74.1990),
    dep("Meta", 4.1420, -73.6266),
    dep("Nariño", 1.2136, -77.2811),
    dep("Norte de Santander", 7.8939, -72.5078),
    dep("Putumayo", 1.1522, -76.6466),
    dep("Quindío", 4.5339, -75.6811),
    dep("Risaralda", 4.8133, -75.6961),
    dep("San Andrés y Providencia", 12.5847, -81.7006),
    dep("Santander", 7.1193, -73.1227),
    dep("Sucre", 9.3047, -75.3978),
    dep("Tolima", 4.4389, -75.2322),
    dep("Valle del Cauca", 3.4516, -76.5320),
    dep("Vaupés", 1.2538, -70.2345),
    dep("Vichada", 6.1890, -67.4859),
];

/// Nombres alternativos frecuentes (ya normalizados) → nombre oficial.
const ALIAS: [(&str, &str); 14] = [
    ("bogota", "Bogotá D.C."),
    ("bogota dc", "Bogotá D.C."),
    ("bogota d c", "Bogotá D.C."),
    ("distrito capital", "Bogotá D.C."),
    ("santa fe de bogota", "Bogotá D.C."),
    ("valle", "Valle del Cauca"),
    ("guajira", "La Guajira"),
    ("san andres", "San Andrés y Providencia"),
    ("san andres providencia y santa catalina", "San Andrés y Providencia"),
    ("archipielago de san andres", "San Andrés y Providencia"),
    ("n de santander", "Norte de Santander"),
    ("norte santander", "Norte de Santander"),
    ("medellin", "Antioquia"),
    ("cali", "Valle del Cauca"),
];

/// Umbral de similitud Jaro-Winkler para aceptar una coincidencia aproximada.
pub const UMBRAL_SIMILITUD: f64 = 0.90;

fn sin_tilde(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' => 'a',
        'é' | 'è' | 'ë' => 'e',
        'í' | 'ì' | 'ï' => 'i',
        'ó' | 'ò' | 'ö' => 'o',
        'ú' | 'ù' | 'ü' => 'u',
        'ñ' => 'n',
        otro => otro,
    }
}

/// Minúsculas, sin tildes ni puntuación, espacios simples y sin prefijo "departamento de".
pub fn normalizar_nombre(s: &str) -> String {
    let limpio: String = s
        .to_lowercase()
        .chars()
        .map(sin_tilde)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut palabras: Vec<&str> = limpio.split_whitespace().collect();
    if palabras.first().map(|p| *p == "departamento" || *p == "depto" || *p == "dpto").unwrap_or(false) {
        palabras.remove(0);
        if palabras.first() == Some(&"de") || palabras.first() == Some(&"del") {
            palabras.remove(0);
        }
    }
    palabras.join(" ")
}

fn por_nombre_oficial(nombre: &str) -> Option<&'static Departamento> {
    DEPARTAMENTOS.iter().find(|d| d.nombre == nombre)
}

/// Resuelve un nombre libre al departamento correspondiente.
pub fn buscar_departamento(nombre: &str) -> Option<&'static Departamento> {
    let n = normalizar_nombre(nombre);
    if n.is_empty() {
        return None;
    }
    if let Some(d) = DEPARTAMENTOS.iter().find(|d| normalizar_nombre(d.nombre) == n) {
        return Some(d);
    }
    if let Some((_, oficial)) = ALIAS.iter().find(|(alias, _)| *alias == n) {
        return por_nombre_oficial(oficial);
    }

    let mut mejor: Option<(&'static Departamento, f64)> = None;
    for d in DEPARTAMENTOS.iter() {
        let sim = jaro_winkler(&normalizar_nombre(d.nombre), &n);
        if sim >= UMBRAL_SIMILITUD && mejor.map(|(_, s)| sim > s).unwrap_or(true) {
            mejor = Some((d, sim));
        }
    }
    mejor.map(|(d, _)| d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normaliza() {
        assert_eq!(normalizar_nombre("Departamento de  Nariño"), "narino");
        assert_eq!(normalizar_nombre("Bogotá, D.C."), "bogota d c");
    }

    #[test]
    fn exacto_y_sin_tildes() {
        assert_eq!(buscar_departamento("Atlántico").unwrap().nombre, "Atlántico");
        assert_eq!(buscar_departamento("ATLANTICO").unwrap().nombre, "Atlántico");
    }

    #[test]
    fn alias() {
        let bogota = buscar_departamento("Bogotá D.C.").unwrap();
        assert_eq!(buscar_departamento("bogota").unwrap(), bogota);
        assert_eq!(buscar_departamento("Distrito Capital").unwrap(), bogota);
        assert_eq!(buscar_departamento("Valle").unwrap().nombre, "Valle del Cauca");
    }

    #[test]
    fn aproximado() {
        assert_eq!(buscar_departamento("Antiokia").unwrap().nombre, "Antioquia");
        assert_eq!(buscar_departamento("Risaralta").unwrap().nombre, "Risaralda");
    }

    #[test]
    fn desconocido() {
        assert!(buscar_departamento("Texas").is_none());
        assert!(buscar_departamento("   ").is_none());
    }

    #[test]
    fn treinta_y_tres_entradas_unicas() {
        let mut nombres: Vec<&str> = DEPARTAMENTOS.iter().map(|d| d.nombre).collect();
        nombres.sort();
        nombres.dedup();
        assert_eq!(nombres.len(), 33);
    }
}

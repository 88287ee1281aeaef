pub mod direction {
    const COMPASS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];

    // An up arrow turned clockwise in 45 degree steps.
    const ARROWS: [&str; 8] = ["↑", "↗", "→", "↘", "↓", "↙", "←", "↖"];

    pub fn degree_to_compass<'a>(deg: f64) -> &'a str {
        COMPASS[sector(deg, 16)]
    }

    /// Arrow glyph for an up arrow rotated clockwise by `rotation` degrees.
    pub fn rotated_arrow<'a>(rotation: f64) -> &'a str {
        ARROWS[sector(rotation, 8)]
    }

    fn sector(deg: f64, sectors: usize) -> usize {
        let width = 360.0 / sectors as f64;
        let deg = deg.rem_euclid(360.0);
        (deg / width + 0.5) as usize % sectors
    }

    #[test]
    fn test_degree_to_compass() {
        assert_eq!(degree_to_compass(0.0), "N");
        assert_eq!(degree_to_compass(90.0), "E");
        assert_eq!(degree_to_compass(180.0), "S");
        assert_eq!(degree_to_compass(270.0), "W");
        assert_eq!(degree_to_compass(360.0), "N");
        assert_eq!(degree_to_compass(-90.0), "W");
    }

    #[test]
    fn test_rotated_arrow() {
        assert_eq!(rotated_arrow(0.0), "↑");
        assert_eq!(rotated_arrow(44.0), "↗");
        assert_eq!(rotated_arrow(180.0), "↓");
        assert_eq!(rotated_arrow(270.0), "←");
        assert_eq!(rotated_arrow(350.0), "↑");
        assert_eq!(rotated_arrow(720.0), "↑");
    }
}

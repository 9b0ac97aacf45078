//! Embedded fallback datasets.
//!
//! Served when neither the open-data portal nor the local store yields
//! records, so every tool answers with something representative.

use kanazawa_store::models::{BusScheduleEntry, GarbageSchedule, TouristSpot, TransportationStop};

#[must_use]
pub fn garbage_schedules() -> Vec<GarbageSchedule> {
    vec![
        GarbageSchedule {
            area_code: "01".to_string(),
            date: "2024-01-15".to_string(),
            garbage_type: "燃やすごみ".to_string(),
            description: Some("中央地区: 月・木曜日に収集します".to_string()),
        },
        GarbageSchedule {
            area_code: "02".to_string(),
            date: "2024-01-16".to_string(),
            garbage_type: "燃やさないごみ".to_string(),
            description: Some("東山地区: 第2・4火曜日に収集します".to_string()),
        },
    ]
}

#[must_use]
pub fn tourist_spots() -> Vec<TouristSpot> {
    vec![
        TouristSpot {
            name: "兼六園".to_string(),
            description: "日本三名園の一つ。四季折々の美しい景色が楽しめます。".to_string(),
            latitude: 36.5620,
            longitude: 136.6622,
            category: Some("庭園".to_string()),
            address: Some("石川県金沢市兼六町1".to_string()),
            opening_hours: Some("7:00-18:00（季節により変動）".to_string()),
            contact: Some("076-234-3800".to_string()),
        },
        TouristSpot {
            name: "金沢城".to_string(),
            description: "歴史ある城郭。石川門や三十間長屋が見どころです。".to_string(),
            latitude: 36.5648,
            longitude: 136.6593,
            category: Some("史跡".to_string()),
            address: Some("石川県金沢市丸の内1-1".to_string()),
            opening_hours: Some("9:00-16:30".to_string()),
            contact: Some("076-234-3800".to_string()),
        },
    ]
}

#[must_use]
pub fn transportation_stops() -> Vec<TransportationStop> {
    vec![
        TransportationStop {
            name: "金沢駅".to_string(),
            kind: "train_station".to_string(),
            latitude: 36.5778,
            longitude: 136.6483,
            address: Some("石川県金沢市木ノ新保町1-1".to_string()),
            routes: Some(vec![
                "北陸新幹線".to_string(),
                "JR北陸本線".to_string(),
                "IRいしかわ鉄道".to_string(),
            ]),
        },
        TransportationStop {
            name: "武蔵ヶ辻・近江町市場".to_string(),
            kind: "bus_stop".to_string(),
            latitude: 36.5668,
            longitude: 136.6564,
            address: Some("石川県金沢市上近江町".to_string()),
            routes: Some(vec![
                "ふらっとバス材木ルート".to_string(),
                "路線バス".to_string(),
            ]),
        },
    ]
}

/// Flat-bus timetable, ordered by route then departure.
#[must_use]
pub fn bus_schedule() -> Vec<BusScheduleEntry> {
    [
        ("ふらっとバス材木ルート", "武蔵ヶ辻・近江町市場", "14:40", "材木町", "Z-07"),
        ("ふらっとバス材木ルート", "武蔵ヶ辻・近江町市場", "15:00", "材木町", "Z-08"),
        ("ふらっとバス材木ルート", "東山", "15:20", "武蔵ヶ辻", "Z-09"),
        ("ふらっとバス材木ルート", "武蔵ヶ辻・近江町市場", "15:40", "材木町", "Z-10"),
        ("ふらっとバス材木ルート", "武蔵ヶ辻・近江町市場", "16:00", "材木町", "Z-11"),
        ("ふらっとバス此花ルート", "金沢駅東口", "15:10", "此花町", "K-05"),
        ("ふらっとバス此花ルート", "金沢駅東口", "16:10", "此花町", "K-06"),
        ("ふらっとバス菊川ルート", "香林坊", "15:30", "菊川", "C-04"),
        ("ふらっとバス長町ルート", "香林坊", "10:00", "長町", "N-01"),
        ("城下まち金沢周遊バス", "金沢駅東口", "09:00", "兼六園", "S-01"),
    ]
    .into_iter()
    .map(
        |(route_name, stop_name, departure_time, destination, bus_number)| BusScheduleEntry {
            route_name: route_name.to_string(),
            stop_name: stop_name.to_string(),
            departure_time: departure_time.to_string(),
            destination: destination.to_string(),
            bus_number: bus_number.to_string(),
        },
    )
    .collect()
}

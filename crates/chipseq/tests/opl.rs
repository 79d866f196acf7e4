use approx::assert_relative_eq;
use chipseq::event::{ConfigOption, Event, EventKind, Origin, RhythmRole, Tempo};
use chipseq::opl::{self, OplEntry, OplParser, OplRecord};
use chipseq::patch::Patch;
use chipseq::{Error, PatchRegistry};

fn write(reg: u16, val: u8) -> OplEntry {
    OplEntry::Write { reg, val }
}

fn tempo() -> Event {
    Event::tempo(Tempo::default())
}

fn parse(entries: &[OplEntry]) -> (Vec<Event>, PatchRegistry) {
    let out = opl::parse_opl(entries, &tempo()).expect("parse failed");
    (out.events, out.patches)
}

fn note_on_fields(ev: &Event) -> (f64, f64, usize) {
    match ev.kind {
        EventKind::NoteOn {
            frequency,
            velocity,
            instrument,
        } => (frequency, velocity, instrument),
        ref other => panic!("expected NoteOn, got {:?}", other),
    }
}

fn melodic(channel: u8) -> Option<Origin> {
    Some(Origin::Opl {
        channel,
        rhythm: None,
    })
}

fn percussion(channel: u8, role: RhythmRole) -> Option<Origin> {
    Some(Origin::Opl {
        channel,
        rhythm: Some(role),
    })
}

fn opl_patch(patches: &PatchRegistry, index: usize) -> chipseq::patch::OplPatch {
    match patches.get(index) {
        Some(Patch::Opl(p)) => *p,
        other => panic!("expected OPL patch at {}, got {:?}", index, other),
    }
}

#[test]
fn test_key_on_and_off() {
    let (events, patches) = parse(&[
        write(0xA0, 0x44),
        write(0xB0, 0x32),
        OplEntry::Delay(24),
        write(0xB0, 0x12),
        OplEntry::Delay(24),
    ]);

    assert_eq!(events.len(), 5);
    assert_eq!(events[0], tempo());
    let (frequency, velocity, instrument) = note_on_fields(&events[1]);
    assert_relative_eq!(
        frequency,
        0x244 as f64 * 49716.0 * 2f64.powi(4 - 20),
        epsilon = 1e-9
    );
    assert_relative_eq!(velocity, 1.0);
    assert_eq!(instrument, 0);
    assert_eq!(events[1].origin, melodic(0));
    assert_eq!(events[2], Event::delay(24));
    assert_eq!(events[3].kind, EventKind::NoteOff);
    assert_eq!(events[3].origin, melodic(0));
    assert_eq!(events[4], Event::delay(24));
    assert_eq!(patches.len(), 1);
}

#[test]
fn test_key_on_without_trailing_delay() {
    let (events, _) = parse(&[write(0xB4, 0x20)]);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].origin, melodic(4));
}

#[test]
fn test_overwritten_write_produces_nothing() {
    let (events, patches) = parse(&[
        write(0xB0, 0x20),
        write(0xB0, 0x00),
        OplEntry::Delay(8),
    ]);
    assert_eq!(events, vec![tempo(), Event::delay(8)]);
    assert!(patches.is_empty());
}

#[test]
fn test_adjacent_delays_coalesce() {
    let (events, _) = parse(&[
        OplEntry::Delay(4),
        OplEntry::Delay(6),
        write(0x40, 0x3F),
        OplEntry::Delay(1),
    ]);
    // The operator write is not a key-on, so the delays merge across it.
    assert_eq!(events, vec![tempo(), Event::delay(11)]);
}

#[test]
fn test_delay_past_u32_starts_new_event() {
    let (events, _) = parse(&[OplEntry::Delay(u32::MAX), OplEntry::Delay(1)]);
    assert_eq!(
        events,
        vec![tempo(), Event::delay(u32::MAX), Event::delay(1)]
    );
}

#[test]
fn test_velocity_from_carrier_level() {
    let (events, _) = parse(&[
        // Channel 0 carrier half way, channel 1 carrier silent.
        write(0x43, 32),
        write(0x44, 63),
        write(0xB0, 0x20),
        write(0xB1, 0x20),
        OplEntry::Delay(1),
    ]);
    let (_, half, _) = note_on_fields(&events[1]);
    let (_, silent, _) = note_on_fields(&events[2]);
    assert_relative_eq!(half, 1.0 - 33f64.ln() / 64f64.ln(), epsilon = 1e-12);
    assert_relative_eq!(silent, 0.0);
}

#[test]
fn test_identical_patches_share_index() {
    let (events, patches) = parse(&[
        write(0xB0, 0x20),
        write(0xB1, 0x20),
        // Channel 2 modulator gets a frequency multiplier.
        write(0x22, 0x01),
        write(0xB2, 0x20),
        OplEntry::Delay(1),
    ]);

    let instruments: Vec<usize> = events[1..4]
        .iter()
        .map(|ev| note_on_fields(ev).2)
        .collect();
    assert_eq!(instruments, vec![0, 0, 1]);
    assert_eq!(patches.len(), 2);
    let p = opl_patch(&patches, 1);
    assert_eq!(p.slots[0].map(|op| op.freq_mult), Some(1));
}

#[test]
fn test_instrument_change_while_keyed_is_silent() {
    let (events, patches) = parse(&[
        write(0xB0, 0x20),
        OplEntry::Delay(5),
        write(0x20, 0x0F),
        OplEntry::Delay(5),
        write(0xB0, 0x00),
        OplEntry::Delay(5),
        write(0xB0, 0x20),
        OplEntry::Delay(5),
    ]);

    assert_eq!(events.len(), 7);
    assert_eq!(events[2], Event::delay(10));
    // The second note picks up the new multiplier.
    assert_eq!(note_on_fields(&events[5]).2, 1);
    assert_eq!(patches.len(), 2);
}

#[test]
fn test_wavesel_configuration() {
    let (events, _) = parse(&[
        write(0x01, 0x20),
        OplEntry::Delay(2),
        // Other bits of the register never produce an event.
        write(0x01, 0x21),
        OplEntry::Delay(2),
        write(0x01, 0x01),
        OplEntry::Delay(2),
    ]);
    assert_eq!(
        events,
        vec![
            tempo(),
            Event::configuration(ConfigOption::EnableWaveSel, true),
            Event::delay(4),
            Event::configuration(ConfigOption::EnableWaveSel, false),
            Event::delay(2),
        ]
    );
}

#[test]
fn test_rhythm_roles() {
    let (events, patches) = parse(&[
        // Rhythm mode with bass drum.
        write(0xBD, 0x30),
        OplEntry::Delay(3),
        // Bass drum off, snare and hi-hat on.
        write(0xBD, 0x29),
        OplEntry::Delay(3),
        // Tom-tom and cymbal on.
        write(0xBD, 0x2F),
        OplEntry::Delay(3),
    ]);

    let tagged: Vec<(EventKind, Option<Origin>)> = events
        .iter()
        .filter(|ev| !ev.is_delay())
        .skip(1)
        .map(|ev| {
            let kind = match ev.kind {
                EventKind::NoteOn { .. } => EventKind::NoteOn {
                    frequency: 0.0,
                    velocity: 0.0,
                    instrument: 0,
                },
                ref other => other.clone(),
            };
            (kind, ev.origin)
        })
        .collect();
    let on = EventKind::NoteOn {
        frequency: 0.0,
        velocity: 0.0,
        instrument: 0,
    };
    assert_eq!(
        tagged,
        vec![
            (on.clone(), percussion(6, RhythmRole::BassDrum)),
            (EventKind::NoteOff, percussion(6, RhythmRole::BassDrum)),
            (on.clone(), percussion(7, RhythmRole::HiHat)),
            (on.clone(), percussion(7, RhythmRole::SnareDrum)),
            (on.clone(), percussion(8, RhythmRole::TomTom)),
            (on, percussion(8, RhythmRole::TopCymbal)),
        ]
    );

    // Bass drum uses both operators, the others one each.
    let bd = opl_patch(&patches, note_on_fields(&events[1]).2);
    assert!(bd.slots[0].is_some() && bd.slots[1].is_some());
    let hh = events
        .iter()
        .find(|ev| ev.origin == percussion(7, RhythmRole::HiHat))
        .map(|ev| opl_patch(&patches, note_on_fields(ev).2))
        .expect("hi-hat note");
    assert!(hh.slots[0].is_some());
    assert!(hh.slots[1].is_none());
}

#[test]
fn test_rhythm_mode_takes_over_channel_keys() {
    let (events, _) = parse(&[
        write(0xBD, 0x20),
        write(0xB6, 0x20),
        write(0xB5, 0x20),
        OplEntry::Delay(1),
    ]);
    // Channel 6 is the bass drum now, so only channel 5 keys on.
    assert_eq!(events.len(), 3);
    assert_eq!(events[1].origin, melodic(5));
}

#[test]
fn test_opl3_second_bank() {
    let entries = [
        write(0x105, 0x01),
        write(0x1A0, 0x44),
        write(0x1B0, 0x32),
        OplEntry::Delay(6),
    ];
    let (events, _) = parse(&entries);
    assert_eq!(
        events[1],
        Event::configuration(ConfigOption::EnableOpl3, true)
    );
    assert_eq!(events[2].origin, melodic(9));
    let (frequency, _, _) = note_on_fields(&events[2]);
    assert_relative_eq!(
        frequency,
        0x244 as f64 * 49716.0 * 2f64.powi(4 - 20),
        epsilon = 1e-9
    );

    // Without OPL3 mode the second bank is never examined.
    let (events, _) = parse(&entries[1..]);
    assert_eq!(events, vec![tempo(), Event::delay(6)]);
}

#[test]
fn test_four_operator_patch() {
    let (events, patches) = parse(&[
        write(0x105, 0x01),
        write(0x104, 0x01),
        write(0xC0, 0x0B),
        write(0xC3, 0x01),
        // Operators 3 and 4 of the pair live in channel 3's slots.
        write(0x28, 0x02),
        write(0x2B, 0x03),
        write(0xB0, 0x20),
        OplEntry::Delay(1),
    ]);

    assert_eq!(events[2].origin, melodic(0));
    let p = opl_patch(&patches, note_on_fields(&events[2]).2);
    assert!(p.slots.iter().all(Option::is_some));
    assert_eq!(p.feedback, 5);
    assert_eq!(p.connection, 0b11);
    assert_eq!(p.slots[2].map(|op| op.freq_mult), Some(2));
    assert_eq!(p.slots[3].map(|op| op.freq_mult), Some(3));
}

#[test]
fn test_tempo_entries() {
    let fast = Tempo::new(250_000, 48);
    let slow = Tempo::new(750_000, 48);
    let (events, _) = parse(&[
        OplEntry::Delay(10),
        OplEntry::Tempo(fast),
        OplEntry::Tempo(slow),
        OplEntry::Delay(10),
    ]);
    assert_eq!(
        events,
        vec![
            tempo(),
            Event::delay(10),
            Event::tempo(slow),
            Event::delay(10)
        ]
    );
}

#[test]
fn test_initial_tempo_replaced_before_first_delay() {
    let fast = Tempo::new(250_000, 48);
    let (events, _) = parse(&[OplEntry::Tempo(fast), OplEntry::Delay(1)]);
    assert_eq!(events, vec![Event::tempo(fast), Event::delay(1)]);
}

#[test]
fn test_invalid_initial_tempo() {
    let err = opl::parse_opl(&[], &Event::delay(1)).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn test_custom_conversion_factor() {
    let out = OplParser::new()
        .with_conversion_factor(49716.0 * 2.0)
        .parse(&[write(0xA0, 0x44), write(0xB0, 0x32)], &tempo())
        .unwrap();
    let (frequency, _, _) = note_on_fields(&out.events[1]);
    assert_relative_eq!(
        frequency,
        0x244 as f64 * 49716.0 * 2.0 * 2f64.powi(4 - 20),
        epsilon = 1e-9
    );
}

#[test]
fn test_unusable_conversion_factor() {
    // Rejected even when no note-on ever needs a frequency.
    for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = OplParser::new()
            .with_conversion_factor(factor)
            .parse(&[OplEntry::Delay(1)], &tempo())
            .unwrap_err();
        assert!(
            matches!(err, Error::InvalidArgument(_)),
            "factor {} gave {:?}",
            factor,
            err
        );
    }
}

#[test]
fn test_records_are_validated_first() {
    let records = vec![
        OplRecord::write(0xB0, 0x20),
        OplRecord::delay(1),
        OplRecord {
            reg: Some(0xB0),
            delay: Some(3),
            ..Default::default()
        },
    ];
    let err = opl::parse_opl_records(&records, &tempo()).unwrap_err();
    assert!(matches!(err, Error::MalformedEntry(_)));

    let bad_tempo = [OplRecord::tempo(Event::note_off())];
    let err = opl::parse_opl_records(&bad_tempo, &tempo()).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn test_records_from_json() {
    let json = r#"[
        { "reg": 160, "val": 68 },
        { "reg": 176, "val": 50 },
        { "delay": 12 },
        { "tempo": { "kind": { "Tempo": { "us_per_quarter_note": 400000, "ticks_per_quarter_note": 48 } } } },
        { "reg": 176, "val": 18 },
        { "delay": 12 }
    ]"#;
    let records: Vec<OplRecord> = serde_json::from_str(json).unwrap();
    let out = opl::parse_opl_records(&records, &tempo()).unwrap();

    assert_eq!(out.events.len(), 6);
    assert!(matches!(out.events[1].kind, EventKind::NoteOn { .. }));
    assert_eq!(out.events[3], Event::tempo(Tempo::new(400_000, 48)));
    assert_eq!(out.events[4].kind, EventKind::NoteOff);
}

#[test]
fn test_empty_record_json_is_malformed() {
    let records: Vec<OplRecord> = serde_json::from_str("[{}]").unwrap();
    assert!(matches!(
        opl::parse_opl_records(&records, &tempo()),
        Err(Error::MalformedEntry(_))
    ));
}

use mfdedit::CardImage;
use proptest::prelude::*;

fn dump() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        proptest::collection::vec(any::<u8>(), 320),
        proptest::collection::vec(any::<u8>(), 1024),
        proptest::collection::vec(any::<u8>(), 4096),
    ]
}

proptest! {
    #[test]
    fn untouched_dump_round_trips(data in dump()) {
        let mut image = CardImage::parse(&data).unwrap();
        prop_assert_eq!(image.serialize(), data);
    }

    #[test]
    fn reparse_yields_identical_tables(data in dump()) {
        let a = CardImage::parse(&data).unwrap();
        let b = CardImage::parse(&a.to_bytes()).unwrap();
        prop_assert_eq!(a.access_table(), b.access_table());
        prop_assert_eq!(a.status_table(), b.status_table());
    }

    #[test]
    fn nibble_edit_changes_only_its_nibble(
        data in dump(),
        block_pick in any::<prop::sample::Index>(),
        nibble in 10usize..32,
        digit in prop::sample::select(vec!['0', '7', 'a', 'F']),
    ) {
        let mut image = CardImage::parse(&data).unwrap();
        let row = *block_pick.get(image.layout().rows());
        image.edit_hex_nibble(row.sector, row.block, nibble, digit).unwrap();

        let edited = image.to_bytes();
        let offset = row.absolute * 16 + nibble / 2;
        for (i, (before, after)) in data.iter().zip(&edited).enumerate() {
            if i != offset {
                prop_assert_eq!(before, after, "byte {}", i);
            }
        }
        let value = digit.to_digit(16).unwrap() as u8;
        let got = if nibble % 2 == 0 { edited[offset] >> 4 } else { edited[offset] & 0x0F };
        prop_assert_eq!(got, value);
    }

    #[test]
    fn access_edit_only_touches_trailer_access_bytes(
        data in dump(),
        block_pick in any::<prop::sample::Index>(),
        position in 0usize..3,
        bit in any::<bool>(),
    ) {
        let mut image = CardImage::parse(&data).unwrap();
        let row = *block_pick.get(image.layout().rows());
        let digit = if bit { '1' } else { '0' };
        image.edit_access_bit(row.sector, row.block, position, digit).unwrap();

        let trailer = row.absolute - row.block + image.sectors()[row.sector].len() - 1;
        let access = trailer * 16 + 6..trailer * 16 + 9;
        let edited = image.to_bytes();
        for (i, (before, after)) in data.iter().zip(&edited).enumerate() {
            if !access.contains(&i) {
                prop_assert_eq!(before, after, "byte {}", i);
            }
        }
        let decoded = image.access(row.sector, row.block).unwrap();
        if let Some(b) = decoded.bit(position) {
            prop_assert_eq!(b, bit);
        }
    }
}
